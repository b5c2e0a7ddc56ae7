//! 回显插件：把事件数据原样放回响应，`state` 为事件名
use pluggable_core::factory::PluginFactory;
use pluggable_core::{Event, EventResponse};
use std::process::ExitCode;

fn echo(event: &Event) -> EventResponse {
    EventResponse::builder()
        .state(event.name.as_str())
        .data(event.data.clone())
        .logs(format!("echoed {} bytes", event.data.len()))
        .build()
}

fn main() -> ExitCode {
    let factory = PluginFactory::new()
        .with("demo.greet", echo)
        .with("package.install", echo);

    match factory.serve() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pluggable-echo: {e}");
            ExitCode::FAILURE
        }
    }
}
