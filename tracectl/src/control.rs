// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing runtime control.

use ordermap::OrderMap;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, Registry, filter::LevelFilter, prelude::*, reload};

use crate::display::TargetCfgDbByTag;
use crate::targets::{STarget, TRACING_TARGETS, TargetKind};
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &[]);

/// Runtime configuration of one tracing target
#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) kind: TargetKind,
    pub(crate) level: LevelFilter,
    pub(crate) tags: Vec<&'static str>,
}
impl From<&STarget> for TargetCfg {
    fn from(declared: &STarget) -> Self {
        // a target can always be addressed by its name
        let mut tags = declared.tags.to_vec();
        if !tags.contains(&declared.name) {
            tags.push(declared.name);
        }
        Self {
            target: declared.target,
            name: declared.name,
            kind: declared.kind,
            level: declared.level,
            tags,
        }
    }
}
impl TargetCfg {
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub(crate) tag: &'static str,
    pub(crate) targets: HashSet<&'static str>,
}
impl Tag {
    fn new(tag: &'static str, target: &'static str) -> Self {
        let mut targets = HashSet::with_capacity(1);
        targets.insert(target);
        Self { tag, targets }
    }
}

#[derive(Debug)]
pub(crate) struct TargetCfgDb {
    pub(crate) level: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetCfg>,
    pub(crate) tags: OrderMap<&'static str, Tag>,
}

impl TargetCfgDb {
    fn new(level: LevelFilter) -> Self {
        let mut db = Self {
            level,
            targets: OrderMap::new(),
            tags: OrderMap::new(),
        };
        for declared in TRACING_TARGETS {
            db.register(declared);
        }
        db
    }
    fn register(&mut self, declared: &STarget) {
        let tconfig = TargetCfg::from(declared);
        let target = tconfig.target;
        let tags = tconfig.tags.clone();
        if let Some(exist) = self.targets.insert(target, tconfig) {
            warn!("Target {} has been multiply defined!", exist.target);
        }
        for tag in tags {
            self.tags
                .entry(tag)
                .and_modify(|t| {
                    t.targets.insert(target);
                })
                .or_insert_with(|| Tag::new(tag, target));
        }
    }
    fn env_filter(&self) -> EnvFilter {
        self.targets
            .values()
            .filter_map(|t| format!("{}={}", t.target, t.level).parse().ok())
            .fold(EnvFilter::new(self.level.to_string()), EnvFilter::add_directive)
    }
    /// Config string which would reproduce the current configuration, target by target.
    fn as_config_string(&self) -> String {
        let mut out = format!("default={}", self.level);
        for target in self.targets.values() {
            out += format!(",{}={}", target.name, target.level).as_str();
        }
        out
    }
    fn tag_targets_mut(&mut self, tag: &str) -> impl Iterator<Item = &mut TargetCfg> {
        let members = self.tags.get(tag).map(|t| t.targets.clone()).unwrap_or_default();
        self.targets
            .values_mut()
            .filter(move |target| members.contains(target.target))
    }
    fn tag_targets(&self, tag: &str) -> impl Iterator<Item = &TargetCfg> {
        let members = self.tags.get(tag).map(|t| &t.targets);
        self.targets
            .values()
            .filter(move |target| members.is_some_and(|m| m.contains(target.target)))
    }
}

/// Errors in a tracing configuration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TracingConfigError {
    #[error("Invalid syntax '{0}': it should be tag=loglevel")]
    Syntax(String),
    #[error("Invalid level '{0}'")]
    Level(String),
}

#[derive(Debug)]
pub struct TracingControl {
    db: Mutex<TargetCfgDb>,
    reload_filter: Option<reload::Handle<EnvFilter, Registry>>,
}
impl TracingControl {
    fn new() -> Self {
        let db = TargetCfgDb::new(LevelFilter::INFO);
        let (filter, reload_filter) = reload::Layer::new(db.env_filter());

        // formatting layer
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(true)
            .with_level(true)
            .with_writer(std::io::stderr);

        // someone else (e.g. a test harness) may own the global subscriber already
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .with(tracing_error::ErrorLayer::default())
            .try_init()
            .is_ok();
        if !installed {
            warn!("A global tracing subscriber is already installed: levels are not reloadable");
        }

        Self {
            db: Mutex::new(db),
            reload_filter: installed.then_some(reload_filter),
        }
    }
    fn lock(&self) -> MutexGuard<'_, TargetCfgDb> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn reload(&self, db: &TargetCfgDb) {
        if let Some(handle) = &self.reload_filter
            && let Err(e) = handle.reload(db.env_filter())
        {
            error!("Failed to reload tracing filter: {e}");
        }
    }
}

/// Get a reference to the static [`TracingControl`], initializing it if needed
static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACING_CTL.get_or_init(TracingControl::new)
}

// public methods for TracingControl
impl TracingControl {
    pub fn init() {
        get_trace_ctl();
    }
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) {
        let mut db = self.lock();
        let mut changed = 0;
        for target in db.tag_targets_mut(tag) {
            if target.level != level {
                target.level = level;
                changed += 1;
            }
        }
        if changed > 0 {
            self.reload(&db);
        }
        debug!("Changed log level for tag '{tag}' to {level}. Targets changed: {changed}");
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        for target in db.targets.values_mut() {
            target.level = level;
        }
        self.reload(&db);
    }
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.level != level {
            db.level = level;
            self.reload(&db);
            debug!("Set default log level to {level}");
        }
    }
    #[must_use]
    pub fn get_default_level(&self) -> LevelFilter {
        self.lock().level
    }

    /// Parse a string made of comma-separated tag=level, where level=off,error,warn,info,debug,trace
    fn parse_tracing_config(
        input: &str,
    ) -> Result<OrderMap<String, LevelFilter>, TracingConfigError> {
        let mut result = OrderMap::new();
        for item in input.split(',').map(str::trim) {
            let Some((tag, level)) = item.split_once('=') else {
                return Err(TracingConfigError::Syntax(item.to_string()));
            };
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| TracingConfigError::Level(level.trim().to_string()))?;
            result.insert(tag.trim().to_string(), level);
        }
        Ok(result)
    }

    /// Apply a configuration string such as `default=error,all=info,dport=trace`.
    ///
    /// `default` sets the level of events not covered by any target, `all` sets every known
    /// target, and any other key sets the targets carrying that tag.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if the string cannot be parsed.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TracingConfigError> {
        let config = Self::parse_tracing_config(input)?;
        if let Some(level) = config.get("default") {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get("all") {
            self.set_level_all(*level);
        }
        // even with all=level, allow tags to override afterwards
        for (tag, level) in &config {
            self.set_tag_level(tag, *level);
        }
        Ok(())
    }

    /// All of the following are to lookup the database or log it
    #[must_use]
    pub fn get_tag(&self, tag: &str) -> Option<Tag> {
        self.lock().tags.get(tag).cloned()
    }
    #[must_use]
    pub fn get_target(&self, target: &str) -> Option<TargetCfg> {
        self.lock().targets.get(target).cloned()
    }
    pub fn get_targets_by_tag(&self, tag: &str) -> impl Iterator<Item = TargetCfg> {
        self.lock()
            .tag_targets(tag)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
    }
    #[must_use]
    pub fn targets_by_tag_string(&self) -> String {
        TargetCfgDbByTag(&self.lock()).to_string()
    }
    #[must_use]
    pub fn targets_string(&self) -> String {
        self.lock().to_string()
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::control::{TracingConfigError, TracingControl, get_trace_ctl};
    use crate::targets::{TRACING_TARGETS, TargetKind};
    use crate::{LevelFilter, custom_target, trace_target};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_init() {
        TracingControl::init();
        let tctl = get_trace_ctl();
        // keyed by module path, selectable by name
        assert!(tctl.get_target("tracectl").is_none());
        assert!(tctl.get_target("dport_tracectl::control").is_some());
        assert!(tctl.get_tag("tracectl").is_some());
    }

    #[test]
    #[serial]
    fn test_auto_register_macro() {
        trace_target!("macro-auto", LevelFilter::ERROR, &[]);
        custom_target!("target-1", LevelFilter::ERROR, &[]);
        custom_target!("target-2", LevelFilter::WARN, &[]);

        // linkme collects targets at link time, even those declared later
        let static_targets: Vec<&str> = TRACING_TARGETS.iter().map(|c| c.target).collect();
        assert!(static_targets.contains(&"target-1"));
        assert!(static_targets.contains(&"target-2"));
        assert!(static_targets.contains(&"target-3"));

        let tctl = get_trace_ctl();
        assert!(tctl.get_target("target-1").is_some());
        assert!(tctl.get_target("target-3").is_some());
        assert_eq!(
            tctl.get_target("target-3").unwrap().kind(),
            TargetKind::Custom
        );

        custom_target!("target-3", LevelFilter::OFF, &["late"]);
    }

    #[test]
    #[serial]
    fn test_change_tag_level() {
        const TAG: &str = "common-tag";
        custom_target!("t1", LevelFilter::DEBUG, &[TAG]);
        custom_target!("t2", LevelFilter::ERROR, &[TAG]);
        custom_target!("t3", LevelFilter::WARN, &[]);

        let tctl = get_trace_ctl();
        assert!(tctl.get_tag(TAG).is_some());
        let targets: Vec<_> = tctl.get_targets_by_tag(TAG).map(|t| t.target).collect();
        assert_eq!(targets.len(), 2);

        tctl.set_tag_level(TAG, LevelFilter::OFF);
        assert_eq!(tctl.get_target("t1").unwrap().level(), LevelFilter::OFF);
        assert_eq!(tctl.get_target("t2").unwrap().level(), LevelFilter::OFF);
        assert_eq!(tctl.get_target("t3").unwrap().level(), LevelFilter::WARN);

        // the name of a target is a tag, too
        tctl.set_tag_level("t3", LevelFilter::TRACE);
        assert_eq!(tctl.get_target("t3").unwrap().level(), LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn test_setup_from_string() {
        custom_target!("s1", LevelFilter::INFO, &["group"]);
        custom_target!("s2", LevelFilter::INFO, &["group"]);
        custom_target!("s3", LevelFilter::INFO, &[]);

        let tctl = get_trace_ctl();
        tctl.setup_from_string("default=warn, group=off,s3=error")
            .unwrap();
        assert_eq!(tctl.get_default_level(), LevelFilter::WARN);
        tctl.get_targets_by_tag("group")
            .for_each(|t| assert_eq!(t.level(), LevelFilter::OFF));
        assert_eq!(tctl.get_target("s3").unwrap().level(), LevelFilter::ERROR);
        let config = tctl.as_config_string().to_lowercase();
        assert!(config.starts_with("default=warn"));
        assert!(config.contains("s3=error"));

        assert_eq!(
            tctl.setup_from_string("group=bad"),
            Err(TracingConfigError::Level("bad".to_string()))
        );
        assert_eq!(
            tctl.setup_from_string("group=error, foo"),
            Err(TracingConfigError::Syntax("foo".to_string()))
        );
        tctl.set_default_level(LevelFilter::INFO);
    }

    #[test]
    #[serial]
    fn test_dumps() {
        custom_target!("dumped", LevelFilter::DEBUG, &["dump-tag"]);
        let tctl = get_trace_ctl();
        assert!(tctl.targets_string().contains("dumped"));
        assert!(tctl.targets_by_tag_string().contains(" dump-tag:"));
    }
}
