use crate::error::{CoreError, CoreResult};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// 插件响应
///
/// 插件在标准输出写出 `{"state", "data", "error", "log"}`，缺失字段按空串处理。
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    #[builder(default, into)]
    #[serde(default)]
    pub state: String,
    /// JSON 序列化后的返回负载
    #[builder(default, into)]
    #[serde(default)]
    pub data: String,
    /// 非空即表示失败
    #[builder(default, into)]
    #[serde(default)]
    pub error: String,
    /// 插件附带的日志（线上字段名为 `log`）
    #[builder(default, into)]
    #[serde(default, rename = "log")]
    pub logs: String,
}

impl EventResponse {
    pub fn errored(&self) -> bool {
        !self.error.is_empty()
    }

    /// 将 `data` 反序列化到调用方指定的类型；对失败响应同样可调用，
    /// 调用方应先检查 `errored()`
    pub fn decode_into<T>(&self) -> CoreResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_str(&self.data).map_err(CoreError::decoding)
    }

    pub fn from_slice(raw: &[u8]) -> CoreResult<Self> {
        serde_json::from_slice(raw).map_err(CoreError::decoding)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn errored_follows_error_field() {
        assert!(!EventResponse::default().errored());
        let resp = EventResponse::builder().error("boom").build();
        assert!(resp.errored());
    }

    #[test]
    fn wire_name_of_logs_is_log() {
        let resp = EventResponse::builder()
            .state("ok")
            .logs("hello")
            .build();
        let json = resp.to_json().unwrap();
        assert_eq!(json, r#"{"state":"ok","data":"","error":"","log":"hello"}"#);

        let back = EventResponse::from_slice(br#"{"log":"again"}"#).unwrap();
        assert_eq!(back.logs, "again");
    }

    #[test]
    fn from_slice_ignores_unknown_fields() {
        // 回显插件会把事件原样写回：name/file 字段应被忽略
        let raw = br#"{"name":"package.install","data":"{\"foo\":\"bar\"}","file":""}"#;
        let resp = EventResponse::from_slice(raw).unwrap();
        assert!(!resp.errored());
        let payload: HashMap<String, String> = resp.decode_into().unwrap();
        assert_eq!(payload["foo"], "bar");
    }

    #[test]
    fn from_slice_rejects_garbage() {
        let err = EventResponse::from_slice(b"plain text").unwrap_err();
        assert!(matches!(err, CoreError::Decoding { .. }));
    }

    #[test]
    fn decode_into_reports_invalid_data() {
        let resp = EventResponse::builder().data("not json").build();
        let err = resp.decode_into::<HashMap<String, String>>().unwrap_err();
        assert!(matches!(err, CoreError::Decoding { .. }));
    }
}
