use component_macros::Component;
use infrastructure_common::{Component, DescriptorBuilder};

#[derive(Default, Component)]
struct Pool;

#[derive(Default, Component)]
#[component(configuration, bean = "pool", customize = extra)]
struct PoolConfiguration;

impl PoolConfiguration {
    fn pool(&self) -> Pool {
        Pool
    }
}

fn extra(builder: DescriptorBuilder<PoolConfiguration>) -> DescriptorBuilder<PoolConfiguration> {
    builder.mark_bean("warm_up")
}

fn main() {
    let descriptor = PoolConfiguration::describe();
    assert!(descriptor.method("pool").is_some());
    assert!(descriptor.method("warm_up").is_some());
    let _ = Pool::describe();
}
