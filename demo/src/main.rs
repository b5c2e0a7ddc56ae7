//! 演示宿主：加载配置、发现插件、发布一次事件并打印全部插件响应
//!
//! 用法：`demo [config.toml] [payload-json]`
//!
//! 未给出配置时管理 `demo.greet` 事件，并显式登记与本程序构建到同一目录的
//! `pluggable-echo`。该目录同时存放 Cargo 的 `.d` 依赖信息文件，不做前缀扫描。
use anyhow::{Context, Result};
use pluggable_core::Plugin;
use pluggable_host::{DiscoveryConfig, Manager, ManagerConfig, env_search_path};
use std::env::consts::EXE_SUFFIX;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_EVENT: &str = "demo.greet";

fn default_config(exe_dir: &Path) -> ManagerConfig {
    let echo = Plugin::new("echo", exe_dir.join(format!("pluggable-echo{EXE_SUFFIX}")));

    ManagerConfig::builder()
        .events(vec![DEFAULT_EVENT.into()])
        .discovery(DiscoveryConfig::builder().plugins(vec![echo]).build())
        .build()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            ManagerConfig::from_path(&path).with_context(|| format!("loading config {path}"))?
        }
        None => {
            let exe = std::env::current_exe().context("locating demo executable")?;
            let dir = exe.parent().context("demo executable has no parent directory")?;
            default_config(dir)
        }
    };
    let payload: serde_json::Value = match args.next() {
        Some(raw) => serde_json::from_str(&raw).context("payload must be valid JSON")?,
        None => serde_json::json!({ "greeting": "hello" }),
    };

    let manager = Manager::from_config(&config, &env_search_path())?;
    let Some(event) = manager.events().first().cloned() else {
        anyhow::bail!("no events configured");
    };
    info!(event = %event, plugins = manager.plugins().len(), "publishing");

    let responses = manager
        .publish_and_collect(
            event,
            &payload,
            manager.plugins().len(),
            Duration::from_secs(30),
        )
        .await?;

    for result in responses {
        let response = &result.response;
        if response.errored() {
            println!("{}: error: {}", result.plugin.name, response.error);
        } else {
            println!(
                "{}: state={} data={}",
                result.plugin.name, response.state, response.data
            );
        }
    }
    Ok(())
}
