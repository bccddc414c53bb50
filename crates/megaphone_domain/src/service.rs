use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::{
    catalog::{self, Catalog},
    config::MegaphoneConfig,
    error::MegaphoneError,
    factory::MegaphoneFactory,
    history::{HistoryProvider, MegaphoneHistory},
    listener::Preconditions,
    megaphone::Megaphone,
};

/// Picks the megaphone to show right now, if any.
///
/// Holds only immutable configuration, so one instance can serve every thread.
pub struct Megaphones {
    catalog: Catalog,
    factory: MegaphoneFactory,
}

pub struct MegaphonesBuilder {
    config: MegaphoneConfig,
    catalog: Option<Catalog>,
    preconditions: Option<Arc<dyn Preconditions>>,
}

impl MegaphonesBuilder {
    pub fn new() -> Self {
        Self {
            config: MegaphoneConfig::default(),
            catalog: None,
            preconditions: None,
        }
    }

    pub fn with_config(mut self, config: MegaphoneConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the catalog derived from the config.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_preconditions(mut self, preconditions: Arc<dyn Preconditions>) -> Self {
        self.preconditions = Some(preconditions);
        self
    }

    pub fn build(self) -> Result<Megaphones> {
        let Some(preconditions) = self.preconditions else {
            anyhow::bail!("megaphones require a preconditions provider");
        };
        let mut config = self.config;
        config.validate()?;
        let catalog = self
            .catalog
            .unwrap_or_else(|| Catalog::from_config(&config));
        let factory = MegaphoneFactory::new(preconditions, config.pins_for_all_schedule());
        Ok(Megaphones { catalog, factory })
    }
}

impl Default for MegaphonesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Megaphones {
    pub fn builder() -> MegaphonesBuilder {
        MegaphonesBuilder::new()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Evaluates every catalog entry against `history` and returns the winner.
    ///
    /// When mandatory and optional megaphones are both eligible, all optional ones
    /// are dropped. The first survivor in catalog order wins. A cataloged event
    /// with no record in `history` is an error even if an earlier entry would win.
    #[instrument(skip(self, history))]
    pub fn next_megaphone(
        &self,
        history: &MegaphoneHistory,
        now: DateTime<Utc>,
    ) -> Result<Option<Megaphone>, MegaphoneError> {
        let mut megaphones = Vec::with_capacity(self.catalog.entries().len());
        for (event, schedule) in self.catalog.entries() {
            let record = history.require(*event)?;
            if !catalog::is_eligible(schedule, record, now) {
                continue;
            }
            debug!(%event, seen_count = record.seen_count, "megaphone is a candidate");
            megaphones.push(self.factory.for_record(record, schedule, now));
        }

        let next = select(megaphones);
        if let Some(megaphone) = &next {
            info!(event = %megaphone.event(), mandatory = megaphone.is_mandatory(), "selected megaphone");
        }
        Ok(next)
    }

    /// Takes a single snapshot from `provider` and selects from it.
    pub fn next_from_provider(
        &self,
        provider: &dyn HistoryProvider,
        now: DateTime<Utc>,
    ) -> Result<Option<Megaphone>> {
        let history = provider.snapshot()?;
        Ok(self.next_megaphone(&history, now)?)
    }
}

/// Candidates arrive in catalog order. Any mandatory candidate drops every optional one.
fn select(mut megaphones: Vec<Megaphone>) -> Option<Megaphone> {
    let has_mandatory = megaphones.iter().any(Megaphone::is_mandatory);
    let has_optional = megaphones.iter().any(|megaphone| !megaphone.is_mandatory());
    if has_mandatory && has_optional {
        debug!("mandatory megaphone preempts optional candidates");
        megaphones.retain(Megaphone::is_mandatory);
    }
    megaphones.into_iter().next()
}
