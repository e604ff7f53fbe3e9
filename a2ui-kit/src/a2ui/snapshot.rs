//! Whole-state snapshot and restore.
//!
//! A [`ProcessorSnapshot`] is a self-contained deep copy of every surface.
//! It serializes to JSON as `{surfaces, dataModels, components}`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::component::ComponentRecord;
use super::config::ProcessorConfig;
use super::error::A2uiError;
use super::message::{A2uiMessage, CreateSurface, UpdateComponents, UpdateDataModel};
use super::processor::{
    A2uiMessageProcessor, ProcessorEvent, StateRestoredEvent, SurfaceContext, SurfaceMap, apply_to,
};

/// Deep copy of a processor's surfaces, data models and component tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorSnapshot {
    #[serde(default)]
    pub surfaces: IndexMap<String, SurfaceContext>,

    #[serde(default)]
    pub data_models: IndexMap<String, Value>,

    #[serde(default)]
    pub components: IndexMap<String, Vec<ComponentRecord>>,
}

impl ProcessorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl A2uiMessageProcessor {
    /// Copy the committed state
    pub fn snapshot(&self) -> ProcessorSnapshot {
        let surfaces = self.surfaces();
        let mut snapshot = ProcessorSnapshot::default();

        for (id, surface) in surfaces.iter() {
            snapshot.surfaces.insert(id.clone(), surface.context.clone());
            snapshot
                .data_models
                .insert(id.clone(), surface.data_model.snapshot());
            snapshot
                .components
                .insert(id.clone(), surface.components.values().cloned().collect());
        }
        snapshot
    }

    /// Replace the whole state with `snapshot`.
    ///
    /// The snapshot is rebuilt through the same validation as live
    /// messages. If any part fails, the current state stays in place and
    /// the cause comes back wrapped in [`A2uiError::Restore`].
    pub fn restore(&self, snapshot: &ProcessorSnapshot) -> Result<(), A2uiError> {
        let result = self.transact(None, |surfaces, config| {
            let rebuilt = rebuild(snapshot, config).map_err(|e| A2uiError::Restore(Box::new(e)))?;
            *surfaces = rebuilt;
            Ok(vec![ProcessorEvent::StateRestored(StateRestoredEvent {
                surface_ids: surfaces.keys().cloned().collect(),
            })])
        });

        result.map(|_| {
            self.clear_statuses();
            log::info!("[A2UI] Restored {} surfaces", snapshot.surfaces.len());
        })
    }
}

fn rebuild(snapshot: &ProcessorSnapshot, config: &ProcessorConfig) -> Result<SurfaceMap, A2uiError> {
    if let Some(orphan) = snapshot
        .data_models
        .keys()
        .chain(snapshot.components.keys())
        .find(|id| !snapshot.surfaces.contains_key(id.as_str()))
    {
        return Err(A2uiError::SurfaceNotFound(orphan.clone()));
    }

    let mut surfaces = SurfaceMap::new();
    for (id, context) in &snapshot.surfaces {
        apply_to(
            &mut surfaces,
            config,
            A2uiMessage::CreateSurface(CreateSurface {
                surface_id: id.clone(),
                catalog_id: context.catalog_id.clone(),
                theme: context.theme.clone(),
                send_data_model: context.send_data_model,
            }),
        )?;

        if let Some(data) = snapshot.data_models.get(id) {
            apply_to(
                &mut surfaces,
                config,
                A2uiMessage::UpdateDataModel(UpdateDataModel::new(id.as_str(), "/", data.clone())),
            )?;
        }

        if let Some(components) = snapshot.components.get(id) {
            apply_to(
                &mut surfaces,
                config,
                A2uiMessage::UpdateComponents(UpdateComponents {
                    surface_id: id.clone(),
                    components: components.clone(),
                    rejected: Vec::new(),
                }),
            )?;
        }
    }
    Ok(surfaces)
}
