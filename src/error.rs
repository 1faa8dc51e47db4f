use thiserror::Error;

/// Errors visible to the caller of [`crate::advertise::advertise`].
///
/// Variants line up with spec §7: the first four are fatal, `Canceled`
/// is returned in place of success after a graceful shutdown.
#[derive(Error, Debug)]
pub enum AdvertiseError {
    #[error("plugin {plugin_name:?} failed to prepare: {cause}")]
    PluginPrepareFailed {
        plugin_name: String,
        cause: anyhow::Error,
    },

    #[error("initial probe advertisement failed: {cause}")]
    InitialSendFailed { cause: anyhow::Error },

    #[error("receiver encountered a fatal error: {0}")]
    ReceiverFatal(anyhow::Error),

    #[error("a send worker encountered a fatal error: {0}")]
    SendFatal(anyhow::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
