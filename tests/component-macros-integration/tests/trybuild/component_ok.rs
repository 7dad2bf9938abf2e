use component_macros::Component;
use infrastructure_common::{Component, Inject, Property, Value};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Default, Component)]
#[component(name = "english", implements(dyn Greeter))]
struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

#[derive(Default, Component)]
#[component(properties = "app", init = "check")]
struct Settings {
    #[inject]
    greeter: Inject<dyn Greeter>,
    #[value("${app.mode}", default = "dev")]
    mode: Value,
    #[property(name = "hosts")]
    host_list: Property<Vec<String>>,
    retries: Property<u32>,
}

impl Settings {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

fn main() {
    let english = English::describe();
    assert_eq!(english.identifier(), "english");

    let settings = Settings::describe();
    assert_eq!(settings.fields().len(), 4);
    assert_eq!(settings.init_methods(), &["check".to_string()]);
    let _ = Settings::default().greeter.get();
    let _ = Settings::default().mode.get();
    let _ = Settings::default().host_list.get();
    let _ = Settings::default().retries.get();
}
