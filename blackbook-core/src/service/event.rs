use std::ops::Deref;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::entity::{RepeatConfig, RepeatedEventMaster, SingleEvent};
use crate::error::{BlackbookError, BlackbookResult};
use crate::mapping::{BusinessObject, BusinessService, MapperRegistry};
use crate::model::{
    RepeatedEventInstanceBo, RepeatedEventMasterBo, SingleEventBo, repeated_event_instance_bo,
};
use crate::repository::{DatedRepository, Repository};
use crate::service::RepeatedEventService;

/// One-off events, with date range queries on top of the generic service.
pub struct SingleEventService {
    core: BusinessService<SingleEvent, SingleEventBo>,
    events: Arc<dyn DatedRepository<SingleEvent>>,
}

impl SingleEventService {
    pub fn new<R>(repository: Arc<R>, mappers: MapperRegistry) -> Self
    where
        R: DatedRepository<SingleEvent> + 'static,
    {
        let generic: Arc<dyn Repository<SingleEvent>> = repository.clone();
        SingleEventService {
            core: BusinessService::new(generic, mappers),
            events: repository,
        }
    }

    /// Events dated within `from..=to`.
    pub fn find_between(&self, from: NaiveDate, to: NaiveDate) -> BlackbookResult<Vec<SingleEventBo>> {
        self.events
            .find_by_date_between(from, to)?
            .iter()
            .map(|event| self.core.to_bo(event))
            .collect()
    }
}

impl Deref for SingleEventService {
    type Target = BusinessService<SingleEvent, SingleEventBo>;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Recurring events. Saving a master materializes its instances first.
pub struct RepeatedEventMasterService {
    core: Arc<BusinessService<RepeatedEventMaster, RepeatedEventMasterBo>>,
    instances: Arc<RepeatedEventService>,
}

impl RepeatedEventMasterService {
    pub fn new(
        core: Arc<BusinessService<RepeatedEventMaster, RepeatedEventMasterBo>>,
        instances: Arc<RepeatedEventService>,
    ) -> Self {
        RepeatedEventMasterService { core, instances }
    }

    /// Day offsets from the master's date that get an instance.
    fn offsets(master: &RepeatedEventMasterBo, date: NaiveDate) -> BlackbookResult<Vec<i64>> {
        match master.repeat_config {
            RepeatConfig::None => Ok(vec![0]),
            RepeatConfig::Daily { every } => {
                let end = master.end_date.ok_or_else(|| {
                    BlackbookError::InvalidEvent(format!(
                        "daily event {} needs an end date",
                        master.id()
                    ))
                })?;
                let every = i64::from(every.get());
                Ok((0..=(end - date).num_days())
                    .filter(|day| day % every == 0)
                    .collect())
            }
        }
    }

    /// Materialize the instances of `master`, then store it.
    ///
    /// The master and every instance are mapped before anything is
    /// written, so a failure leaves both repositories as they were.
    pub fn save(&self, master: &RepeatedEventMasterBo) -> BlackbookResult<RepeatedEventMasterBo> {
        let date = master.event.date.ok_or_else(|| {
            BlackbookError::InvalidEvent(format!("recurring event {} has no start date", master.id()))
        })?;
        self.core.to_bo(&self.core.to_do(master)?)?;

        let instances = Self::offsets(master, date)?
            .into_iter()
            .map(|day| -> BlackbookResult<RepeatedEventInstanceBo> {
                let instance = repeated_event_instance_bo(|instance| {
                    instance.parent = Some(master.clone());
                    instance.date = Some(date + Duration::days(day));
                });
                self.instances.to_do(&instance)?;
                Ok(instance)
            })
            .collect::<BlackbookResult<Vec<_>>>()?;

        for instance in &instances {
            debug!(master = master.id(), instance = %instance.id, date = ?instance.date, "materializing instance");
            // The master is not stored yet, so the instance cannot be read back.
            self.instances.store(instance)?;
        }

        match self.core.save(master) {
            Ok(saved) => {
                info!(master = master.id(), instances = instances.len(), "saved recurring event");
                Ok(saved)
            }
            Err(e) => {
                warn!(master = master.id(), error = %e, "rolling back materialized instances");
                for instance in &instances {
                    self.instances.delete(instance)?;
                }
                Err(e)
            }
        }
    }
}

impl Deref for RepeatedEventMasterService {
    type Target = BusinessService<RepeatedEventMaster, RepeatedEventMasterBo>;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}
