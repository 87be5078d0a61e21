//! 桥接配置的反序列化验证：宿主以 TOML 管理提交通道与工作计数开关。

use spark_execution::{
    BridgeConfig, BridgeOperation, OperationHandle, SubmitMode,
    test_stubs::{ManualExecutor, RecordingConsumer, Signal},
};

#[derive(Debug, serde::Deserialize)]
struct HostConfig {
    bridge: BridgeConfig,
}

/// ## 测试一：完整配置
#[test]
fn full_table_is_parsed() {
    let host: HostConfig = toml::from_str(
        r#"
        [bridge]
        submit_mode = "defer"
        track_work = true
        "#,
    )
    .expect("配置应可解析");
    assert_eq!(host.bridge.submit_mode, SubmitMode::Defer);
    assert!(host.bridge.track_work);
}

/// ## 测试二：缺省字段回落到默认值
#[test]
fn missing_fields_fall_back_to_defaults() {
    let config: BridgeConfig = toml::from_str(r#"submit_mode = "post""#).expect("配置应可解析");
    assert_eq!(config, BridgeConfig::default().with_submit_mode(SubmitMode::Post));

    let empty: BridgeConfig = toml::from_str("").expect("空表应可解析");
    assert_eq!(empty, BridgeConfig::default());
}

/// ## 测试三：未知通道名被拒绝
#[test]
fn unknown_mode_is_rejected() {
    let parsed: Result<BridgeConfig, _> = toml::from_str(r#"submit_mode = "inline""#);
    assert!(parsed.is_err());
}

/// ## 测试四：序列化结果可再次加载，并驱动桥接操作
#[test]
fn serialized_config_drives_bridge() {
    let authored = BridgeConfig::default()
        .with_submit_mode(SubmitMode::Post)
        .with_track_work(true);
    let text = toml::to_string(&authored).expect("配置应可序列化");
    assert!(text.contains(r#"submit_mode = "post""#));
    let loaded: BridgeConfig = toml::from_str(&text).expect("配置应可解析");

    let executor = ManualExecutor::new();
    let (consumer, log) = RecordingConsumer::recording();
    BridgeOperation::with_config(executor.clone(), consumer, loaded).start();
    assert_eq!(executor.outstanding_work(), 1);
    executor.run_pending();
    assert_eq!(log.signals(), vec![Signal::Value]);
    assert_eq!(executor.outstanding_work(), 0);
}
