use ipojo_types::{Properties, PropertyValue};

use crate::registry::service_object;
use crate::MockRegistry;

/// A trivial provider interface fixtures register against.
pub trait Greeter: Send + Sync {
    /// Produce a greeting.
    fn greet(&self) -> String;
}

struct StaticGreeter(&'static str);

impl Greeter for StaticGreeter {
    fn greet(&self) -> String {
        self.0.to_string()
    }
}

/// Register three deterministic `"org.example.Greeter"` providers at
/// distinct rankings, for doc examples and scenario tests (§8 scenario 2):
/// `kitchen` (ranking 5), `hallway` (ranking 5, lower `service.id`, so it
/// sorts ahead of `kitchen` on ties), and `lobby` (ranking 7, highest).
pub fn greeter_providers(registry: &MockRegistry) {
    let mut kitchen = Properties::new();
    kitchen.insert("service.ranking".into(), PropertyValue::Int(5));
    kitchen.insert("location".into(), PropertyValue::from("kitchen"));
    registry.register(
        "org.example.Greeter",
        kitchen,
        service_object(StaticGreeter("hello from the kitchen")),
    );

    let mut hallway = Properties::new();
    hallway.insert("service.ranking".into(), PropertyValue::Int(5));
    hallway.insert("location".into(), PropertyValue::from("hallway"));
    registry.register(
        "org.example.Greeter",
        hallway,
        service_object(StaticGreeter("hello from the hallway")),
    );

    let mut lobby = Properties::new();
    lobby.insert("service.ranking".into(), PropertyValue::Int(7));
    lobby.insert("location".into(), PropertyValue::from("lobby"));
    registry.register(
        "org.example.Greeter",
        lobby,
        service_object(StaticGreeter("hello from the lobby")),
    );
}
