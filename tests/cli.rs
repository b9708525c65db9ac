//! 命令行集成测试

use assert_cmd::Command;

fn babel_proxy() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    for (key, _) in std::env::vars() {
        if key.starts_with("BABEL_PROXY_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

#[test]
fn test_help_lists_flags() {
    let out = babel_proxy().arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    for flag in ["--config", "--bind", "--port", "--cache-dir", "--engine-url"] {
        assert!(stdout.contains(flag), "missing {}", flag);
    }
}

#[test]
fn test_print_env_lists_variables() {
    let out = babel_proxy().arg("--print-env").output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(stdout.contains("BABEL_PROXY_PORT"));
    assert!(stdout.contains("BABEL_PROXY_ENGINE_URL"));
}

#[test]
fn test_config_file_env_and_flags_are_layered() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("proxy.toml");
    std::fs::write(
        &config_path,
        "[server]\nport = 9001\nbind_address = \"0.0.0.0\"\n\n[engine]\nestimated_load_secs = 5\n",
    )
    .unwrap();

    let out = babel_proxy()
        .current_dir(dir.path())
        .env("BABEL_PROXY_ESTIMATED_LOAD_SECS", "7")
        .args(["--config", config_path.to_str().unwrap()])
        .args(["--port", "9002", "--print-config"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("port = 9002"));
    assert!(stdout.contains("bind_address = \"0.0.0.0\""));
    assert!(stdout.contains("estimated_load_secs = 7"));
}

/// 加载配置时的日志写到 stderr，不混入 stdout 的配置输出
#[test]
fn test_config_loading_is_logged_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("proxy.toml");
    std::fs::write(&config_path, "[server]\nport = 9003\n").unwrap();

    let out = babel_proxy()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["--config", config_path.to_str().unwrap(), "--print-config"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert!(out.status.success(), "{}", stderr);
    assert!(stderr.contains("加载配置文件"));
    assert!(stderr.contains("proxy.toml"));
    assert!(!stdout.contains("加载配置文件"));
    assert!(stdout.contains("port = 9003"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let out = babel_proxy()
        .current_dir(dir.path())
        .args(["--engine-url", "not-a-url", "--print-config"])
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("engine api_url"));
}
