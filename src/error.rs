use thiserror::Error;

use crate::workflow::OrderStage;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 订单数据错误
    #[error("订单数据错误: {0}")]
    Source(#[from] SourceError),
    /// 文档生成/合并错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 归档错误
    #[error("归档错误: {0}")]
    Archive(#[from] ArchiveError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 提交后回执始终未出现
    #[error("提交订单失败: 已尝试 {attempts} 次仍未找到 {indicator} (maximum retries reached)")]
    SubmitRetriesExhausted { attempts: u32, indicator: String },
    /// 订单在某个阶段失败（包装内部错误，标明阶段）
    #[error("订单 {order_number} 在「{stage}」阶段失败: {source}")]
    OrderStage {
        order_number: String,
        stage: OrderStage,
        #[source]
        source: Box<AppError>,
    },
    /// 后台阻塞任务失败
    #[error("后台任务失败: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {reason}")]
    ConfigurationFailed { reason: String },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面上找不到元素
    #[error("找不到元素: {selector}")]
    ElementNotFound { selector: String },
    /// 元素交互失败
    #[error("{action} 元素 {selector} 失败: {source}")]
    InteractionFailed {
        action: &'static str,
        selector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 订单数据源错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 下载订单文件失败
    #[error("下载订单文件失败 ({url}): {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// CSV 解析失败
    #[error("CSV解析失败: {0}")]
    CsvParseFailed(#[from] csv::Error),
    /// 订单记录不合法
    #[error("第 {row} 行订单不合法: {reason}")]
    InvalidRecord { row: usize, reason: String },
    /// 订单号重复
    #[error("订单号重复: {order_number}")]
    DuplicateOrderNumber { order_number: String },
}

/// 文档错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 渲染 PDF 失败
    #[error("渲染PDF失败 ({path}): {source}")]
    RenderFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 合并图片失败
    #[error("合并图片到 {path} 失败: {source}")]
    MergeFailed {
        path: String,
        #[source]
        source: lopdf::Error,
    },
    /// 保存 PDF 失败
    #[error("保存PDF失败 ({path}): {reason}")]
    SaveFailed { path: String, reason: String },
    /// 图片无法嵌入
    #[error("图片 {path} 无法嵌入: {reason}")]
    InvalidImage { path: String, reason: String },
}

/// 归档错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 源目录不存在
    #[error("归档源目录不存在: {path}")]
    SourceDirMissing { path: String },
    /// 写入压缩包失败
    #[error("写入压缩包失败 ({path}): {source}")]
    ZipFailed {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 产物文件缺失
    #[error("产物文件缺失: {path}")]
    ArtifactMissing { path: String },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建"找不到元素"错误
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        AppError::Browser(BrowserError::ElementNotFound {
            selector: selector.into(),
        })
    }

    /// 创建元素交互失败错误
    pub fn interaction_failed(
        action: &'static str,
        selector: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::InteractionFailed {
            action,
            selector: selector.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.as_ref().display().to_string(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.as_ref().display().to_string(),
            source,
        })
    }

    /// 给错误标记所属的订单和阶段
    pub fn at_stage(self, order_number: impl Into<String>, stage: OrderStage) -> Self {
        AppError::OrderStage {
            order_number: order_number.into(),
            stage,
            source: Box::new(self),
        }
    }

    /// 是否为"提交重试耗尽"（穿透阶段包装）
    pub fn is_retries_exhausted(&self) -> bool {
        match self {
            AppError::SubmitRetriesExhausted { .. } => true,
            AppError::OrderStage { source, .. } => source.is_retries_exhausted(),
            _ => false,
        }
    }

    /// 失败阶段（若有）
    pub fn stage(&self) -> Option<OrderStage> {
        match self {
            AppError::OrderStage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
