#[cfg(test)]
use std::collections::HashMap;
use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};

use crate::document::DocumentInfo;
use crate::job::PrintJobOptions;
use crate::printer::PrinterInfo;

/// Handle returned once a platform adapter has accepted a job description.
/// 平台列印介面接受作業設定後回傳的控制物件。
pub trait PlatformJobHandle {
    type Error;

    /// Submits the document and blocks until the spooler accepts or rejects it.
    /// 送出文件並等待列印佇列接受或拒絕。
    fn submit(self, document: &Path) -> Result<(), Self::Error>;
}

/// Abstraction over the host's printer directory, document service and
/// print-job service. One adapter is constructed per run and passed around
/// explicitly.
/// 主機印表機清單、文件服務與列印作業服務的抽象介面。
pub trait PlatformAdapter {
    type Error: std::fmt::Display;
    type JobHandle: PlatformJobHandle<Error = Self::Error>;

    /// Every installed printer with its queue and display name.
    /// 列出所有已安裝的印表機（佇列名稱與顯示名稱）。
    fn printers(&self) -> Result<Vec<PrinterInfo>, Self::Error>;

    /// Opens a document and reports its page geometry.
    /// 開啟文件並回報頁面尺寸。
    fn inspect(&self, document: &Path) -> Result<DocumentInfo, Self::Error>;

    /// Builds a job for the given options without submitting it.
    /// 依設定建立列印作業，但尚未送出。
    fn begin_job(&self, options: &PrintJobOptions) -> Result<Self::JobHandle, Self::Error>;
}

/// Recorded job metadata produced by the mock adapter.
/// 模擬介面所記錄的列印作業中繼資料。
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedJob {
    pub options: PrintJobOptions,
    pub document: PathBuf,
}

/// In-memory implementation of [`PlatformAdapter`] used for tests.
/// 測試使用的記憶體內部平台介面實作。
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockPlatformAdapter {
    pub printers: Vec<PrinterInfo>,
    pub documents: HashMap<PathBuf, DocumentInfo>,
    pub reject_submit: Vec<PathBuf>,
    pub fail_begin: bool,
    pub inspected: Arc<Mutex<Vec<PathBuf>>>,
    jobs: Arc<Mutex<Vec<RecordedJob>>>,
}

#[cfg(test)]
impl MockPlatformAdapter {
    /// Registers printers by display name; queues get CUPS-style
    /// underscores in place of spaces.
    pub fn with_printers<'a, I>(display_names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            printers: display_names
                .into_iter()
                .map(|name| PrinterInfo::new(name.replace(' ', "_"), name))
                .collect(),
            ..Self::default()
        }
    }

    pub fn add_document(&mut self, path: impl Into<PathBuf>, width: f64, height: f64) {
        self.documents.insert(
            path.into(),
            DocumentInfo {
                page_count: 1,
                first_page: crate::job::PaperSize::new(width, height),
            },
        );
    }

    pub fn drain_jobs(&self) -> Vec<RecordedJob> {
        self.jobs.lock().expect("lock poisoned").drain(..).collect()
    }
}

#[cfg(test)]
pub struct MockJobHandle {
    options: PrintJobOptions,
    reject: Vec<PathBuf>,
    sink: Arc<Mutex<Vec<RecordedJob>>>,
}

#[cfg(test)]
impl PlatformAdapter for MockPlatformAdapter {
    type Error = String;
    type JobHandle = MockJobHandle;

    fn printers(&self) -> Result<Vec<PrinterInfo>, Self::Error> {
        Ok(self.printers.clone())
    }

    fn inspect(&self, document: &Path) -> Result<DocumentInfo, Self::Error> {
        self.inspected
            .lock()
            .expect("lock poisoned")
            .push(document.to_path_buf());
        self.documents
            .get(document)
            .copied()
            .ok_or_else(|| format!("cannot open {}", document.display()))
    }

    fn begin_job(&self, options: &PrintJobOptions) -> Result<Self::JobHandle, Self::Error> {
        if self.fail_begin {
            return Err("cannot create job".to_string());
        }
        Ok(MockJobHandle {
            options: options.clone(),
            reject: self.reject_submit.clone(),
            sink: self.jobs.clone(),
        })
    }
}

#[cfg(test)]
impl PlatformJobHandle for MockJobHandle {
    type Error = String;

    fn submit(self, document: &Path) -> Result<(), Self::Error> {
        if self.reject.iter().any(|path| path == document) {
            return Err("spooler rejected the job".to_string());
        }
        self.sink.lock().expect("lock poisoned").push(RecordedJob {
            options: self.options,
            document: document.to_path_buf(),
        });
        Ok(())
    }
}
