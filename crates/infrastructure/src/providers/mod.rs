pub mod api;
pub mod docker;
pub mod fs;
pub mod registry;

pub use api::ApiProvider;
pub use docker::DockerProvider;
pub use fs::FsProvider;
pub use registry::{ProviderContext, ProviderRegistry};
