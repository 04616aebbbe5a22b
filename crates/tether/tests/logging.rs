//! Global subscriber installation. Kept in its own test binary because it
//! installs process-wide state.

use tether::logging::{self, LoggingError};

#[test]
fn second_install_is_rejected() {
    logging::init_with("tether=debug").unwrap();
    assert!(matches!(
        logging::init(),
        Err(LoggingError::AlreadyInstalled(_))
    ));
}
