//! Test resource shared by planner and executor tests

use crate::resource::Resource;
use crate::types::{AttributeChange, AttributeDiff};
use anyhow::{Result, bail};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    pub value: String,
}

impl TestConfig {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// Records every lifecycle call; values starting with "fail" fail to apply.
#[derive(Debug, Default)]
pub struct TestResource {
    pub calls: Mutex<Vec<String>>,
}

impl TestResource {
    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Resource for TestResource {
    type Config = TestConfig;
    type Record = String;

    fn resource_type(&self) -> &'static str {
        "test"
    }

    fn describe(&self, config: &TestConfig) -> String {
        format!("Test resource {}", config.value)
    }

    fn attributes(&self, config: &TestConfig) -> Vec<(&'static str, String)> {
        vec![("value", config.value.clone())]
    }

    fn record_id(&self, record: &String) -> String {
        record.clone()
    }

    fn record_attributes(&self, record: &String) -> Vec<(&'static str, String)> {
        vec![("id", record.clone())]
    }

    fn create(&self, config: &TestConfig) -> Result<String> {
        self.record(format!("create:{}", config.value));
        if config.value.starts_with("fail") {
            bail!("cannot create {}", config.value);
        }
        Ok(format!("id-{}", config.value))
    }

    fn read(&self, config: &TestConfig, record: &String) -> Result<String> {
        self.record(format!("read:{}", config.value));
        Ok(record.clone())
    }

    fn delete(&self, record: &String) -> Result<()> {
        self.record(format!("delete:{record}"));
        Ok(())
    }

    fn plan_create(&self, _config: &TestConfig) -> Vec<AttributeDiff> {
        vec![AttributeDiff::new("id", None, AttributeChange::Computed)]
    }

    fn plan_diff(&self, old: &TestConfig, record: &String, new: &TestConfig) -> Vec<AttributeDiff> {
        if old.value == new.value {
            return Vec::new();
        }
        vec![AttributeDiff::new(
            "id",
            Some(record.clone()),
            AttributeChange::Computed,
        )]
    }

    fn conflict_key(&self, config: &TestConfig) -> Option<String> {
        Some(config.value.clone())
    }
}
