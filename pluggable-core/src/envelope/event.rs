use super::EventType;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// 响应事件名后缀：`<event>-results`
pub const RESULTS_SUFFIX: &str = "results";

/// 事件：事件名 + JSON 序列化后的负载
///
/// 线上格式为 `{"name": ..., "data": ..., "file": ...}`。`file_path` 非空时
/// 表示负载存放在该文件中，`data` 不再权威。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// 事件名
    #[serde(default)]
    pub name: EventType,
    /// JSON 序列化后的负载
    #[serde(default)]
    pub data: String,
    /// 负载文件路径（负载过大时由调用器写入临时文件）
    #[serde(default, rename = "file")]
    pub file_path: String,
}

impl Event {
    /// 以任意可序列化对象构造事件，对象会被序列化为 JSON 写入 `data`
    pub fn new<T>(name: impl Into<EventType>, payload: &T) -> CoreResult<Self>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_string(payload).map_err(CoreError::encoding)?;

        Ok(Self {
            name: name.into(),
            data,
            file_path: String::new(),
        })
    }

    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::encoding)
    }

    pub fn from_json(raw: &str) -> CoreResult<Self> {
        serde_json::from_str(raw).map_err(CoreError::decoding)
    }

    /// 关联事件名：`<name>-<suffix>`
    pub fn response_name(&self, suffix: &str) -> EventType {
        EventType::new(format!("{}-{}", self.name, suffix))
    }

    pub fn has_file(&self) -> bool {
        !self.file_path.is_empty()
    }

    /// 若事件指向负载文件，则读取文件内容覆盖 `data` 并清空 `file_path`
    pub fn resolve_file(&mut self) -> CoreResult<()> {
        if !self.has_file() {
            return Ok(());
        }

        self.data = std::fs::read_to_string(&self.file_path)
            .map_err(|e| CoreError::temp_file("read", &self.file_path, e))?;
        self.file_path.clear();
        Ok(())
    }

    /// 将 `data` 反序列化为调用方指定的类型
    pub fn decode_into<T>(&self) -> CoreResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_str(&self.data).map_err(CoreError::decoding)
    }
}
