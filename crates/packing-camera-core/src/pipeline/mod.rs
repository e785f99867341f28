mod camera_pipeline;
mod events;

pub use {
    camera_pipeline::{CameraPipeline, PipelineSettings},
    events::{Alert, AlertKind, PipelineEvent},
};
