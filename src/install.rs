//! Process-wide registration of the signature pad component

use once_cell::sync::OnceCell;

pub const COMPONENT_NAME: &str = "VueSignaturePad";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub component: &'static str,
    pub version: &'static str,
}

static REGISTRATION: OnceCell<Registration> = OnceCell::new();

/// Register the component once per process.
///
/// Returns true only for the call that performed the registration. Logging is
/// initialized here too unless the host already set up a logger.
pub fn install() -> bool {
    let mut installed = false;
    REGISTRATION.get_or_init(|| {
        installed = true;
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .try_init();
        log::info!("Registered component {COMPONENT_NAME}");
        Registration {
            component: COMPONENT_NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    });
    installed
}

pub fn registration() -> Option<&'static Registration> {
    REGISTRATION.get()
}
