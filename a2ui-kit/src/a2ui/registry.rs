//! A2UI Component Registry
//!
//! The standard component catalog, and a strategy table renderers use to
//! map type tags to their own drawing handlers. The core never renders; it
//! only hands out records and resolved values.

use std::collections::HashMap;

/// Standard catalog component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum A2uiComponentType {
    // Layout
    Column,
    Row,
    List,
    Card,
    Tabs,
    Modal,

    // Display
    Text,
    Image,
    Icon,
    Video,
    AudioPlayer,
    Divider,

    // Input
    Button,
    TextField,
    CheckBox,
    DateTimeInput,
    ChoicePicker,
    Slider,
}

/// Broad role of a component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentCategory {
    Layout,
    Display,
    Input,
}

impl A2uiComponentType {
    /// Get the A2UI component type name
    pub fn name(&self) -> &'static str {
        match self {
            A2uiComponentType::Column => "Column",
            A2uiComponentType::Row => "Row",
            A2uiComponentType::List => "List",
            A2uiComponentType::Card => "Card",
            A2uiComponentType::Tabs => "Tabs",
            A2uiComponentType::Modal => "Modal",
            A2uiComponentType::Text => "Text",
            A2uiComponentType::Image => "Image",
            A2uiComponentType::Icon => "Icon",
            A2uiComponentType::Video => "Video",
            A2uiComponentType::AudioPlayer => "AudioPlayer",
            A2uiComponentType::Divider => "Divider",
            A2uiComponentType::Button => "Button",
            A2uiComponentType::TextField => "TextField",
            A2uiComponentType::CheckBox => "CheckBox",
            A2uiComponentType::DateTimeInput => "DateTimeInput",
            A2uiComponentType::ChoicePicker => "ChoicePicker",
            A2uiComponentType::Slider => "Slider",
        }
    }

    /// Parse a type tag. `MultipleChoice` is the older name of `ChoicePicker`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let component_type = match tag {
            "Column" => A2uiComponentType::Column,
            "Row" => A2uiComponentType::Row,
            "List" => A2uiComponentType::List,
            "Card" => A2uiComponentType::Card,
            "Tabs" => A2uiComponentType::Tabs,
            "Modal" => A2uiComponentType::Modal,
            "Text" => A2uiComponentType::Text,
            "Image" => A2uiComponentType::Image,
            "Icon" => A2uiComponentType::Icon,
            "Video" => A2uiComponentType::Video,
            "AudioPlayer" => A2uiComponentType::AudioPlayer,
            "Divider" => A2uiComponentType::Divider,
            "Button" => A2uiComponentType::Button,
            "TextField" => A2uiComponentType::TextField,
            "CheckBox" => A2uiComponentType::CheckBox,
            "DateTimeInput" => A2uiComponentType::DateTimeInput,
            "ChoicePicker" | "MultipleChoice" => A2uiComponentType::ChoicePicker,
            "Slider" => A2uiComponentType::Slider,
            _ => return None,
        };
        Some(component_type)
    }

    pub fn category(&self) -> ComponentCategory {
        match self {
            A2uiComponentType::Column
            | A2uiComponentType::Row
            | A2uiComponentType::List
            | A2uiComponentType::Card
            | A2uiComponentType::Tabs
            | A2uiComponentType::Modal => ComponentCategory::Layout,
            A2uiComponentType::Text
            | A2uiComponentType::Image
            | A2uiComponentType::Icon
            | A2uiComponentType::Video
            | A2uiComponentType::AudioPlayer
            | A2uiComponentType::Divider => ComponentCategory::Display,
            A2uiComponentType::Button
            | A2uiComponentType::TextField
            | A2uiComponentType::CheckBox
            | A2uiComponentType::DateTimeInput
            | A2uiComponentType::ChoicePicker
            | A2uiComponentType::Slider => ComponentCategory::Input,
        }
    }

    /// Get all component types
    pub fn all() -> &'static [A2uiComponentType] {
        &[
            A2uiComponentType::Column,
            A2uiComponentType::Row,
            A2uiComponentType::List,
            A2uiComponentType::Card,
            A2uiComponentType::Tabs,
            A2uiComponentType::Modal,
            A2uiComponentType::Text,
            A2uiComponentType::Image,
            A2uiComponentType::Icon,
            A2uiComponentType::Video,
            A2uiComponentType::AudioPlayer,
            A2uiComponentType::Divider,
            A2uiComponentType::Button,
            A2uiComponentType::TextField,
            A2uiComponentType::CheckBox,
            A2uiComponentType::DateTimeInput,
            A2uiComponentType::ChoicePicker,
            A2uiComponentType::Slider,
        ]
    }
}

/// Strategy table from type tags to renderer handlers.
///
/// Tags outside the standard catalog can be registered too, for custom
/// catalogs. Lookups for unregistered tags fall back to the fallback
/// handler when one is set.
///
/// # Example
///
/// ```
/// use a2ui_kit::a2ui::{A2uiComponentType, ComponentRegistry};
///
/// let mut registry: ComponentRegistry<&str> = ComponentRegistry::new();
/// registry.register_type(A2uiComponentType::Text, "label");
/// registry.set_fallback("placeholder");
///
/// assert_eq!(registry.get("Text"), Some(&"label"));
/// assert_eq!(registry.get("Chart"), Some(&"placeholder"));
/// ```
#[derive(Debug, Clone)]
pub struct ComponentRegistry<H> {
    handlers: HashMap<String, H>,
    fallback: Option<H>,
}

impl<H> Default for ComponentRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ComponentRegistry<H> {
    /// Create a new empty registry
    pub fn new() -> Self {
        ComponentRegistry {
            handlers: HashMap::new(),
            fallback: None,
        }
    }

    /// Create a registry with every standard type mapped through `make`
    pub fn with_standard_catalog(mut make: impl FnMut(A2uiComponentType) -> H) -> Self {
        let mut registry = Self::new();
        for component_type in A2uiComponentType::all() {
            registry.register_type(*component_type, make(*component_type));
        }
        registry
    }

    /// Register (or replace) the handler for a tag
    pub fn register(&mut self, tag: impl Into<String>, handler: H) {
        self.handlers.insert(tag.into(), handler);
    }

    /// Register the handler for a standard type; older aliases resolve to it
    pub fn register_type(&mut self, component_type: A2uiComponentType, handler: H) {
        self.register(component_type.name(), handler);
    }

    /// Handler used for tags nothing was registered for
    pub fn set_fallback(&mut self, handler: H) {
        self.fallback = Some(handler);
    }

    /// Get the handler for a tag
    pub fn get(&self, tag: &str) -> Option<&H> {
        self.handlers
            .get(tag)
            .or_else(|| {
                A2uiComponentType::from_tag(tag).and_then(|t| self.handlers.get(t.name()))
            })
            .or(self.fallback.as_ref())
    }

    /// Check if a tag has its own handler (the fallback does not count)
    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
            || A2uiComponentType::from_tag(tag).is_some_and(|t| self.handlers.contains_key(t.name()))
    }

    /// Get all registered tags
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Standard types without a handler of their own
    pub fn missing_standard_types(&self) -> Vec<A2uiComponentType> {
        A2uiComponentType::all()
            .iter()
            .copied()
            .filter(|t| !self.handlers.contains_key(t.name()))
            .collect()
    }
}
