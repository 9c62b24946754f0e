use super::home_dir;

#[test]
fn agentmux_home_env_var_is_honored_and_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("nested").join("state");
    std::env::set_var("AGENTMUX_HOME", &target);

    let resolved = home_dir().expect("home dir resolves");
    std::env::remove_var("AGENTMUX_HOME");

    assert_eq!(resolved, target);
    assert!(target.is_dir());
}
