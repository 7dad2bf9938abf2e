//! 派生宏的编译期测试

#[test]
fn trybuild_component_derive() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/component_ok.rs");
    t.pass("tests/trybuild/configuration_ok.rs");
}
