//! Everything a host renderer usually needs.

pub use crate::a2ui::{
    A2uiComponentType, A2uiError, A2uiMessageProcessor, Action, ActionDefinition, ActionHandler, ChildList,
    ComponentRecord, ComponentRegistry, DispatchOutcome, DynamicValue, ProcessorConfig, ProcessorEvent,
    ProcessorSnapshot, Surface, TemplateItem, UserAction,
};
