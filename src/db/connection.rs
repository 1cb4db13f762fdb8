use anyhow::{anyhow, Result};

use crate::config::ConnectionSettings;

pub fn build_config(settings: &ConnectionSettings) -> Result<tiberius::Config> {
    let mut config = tiberius::Config::new();
    config.host(&settings.server);
    config.port(settings.port);
    config.database(&settings.database);
    // Reported to the server as program_name.
    config.application_name("ssgrep");

    if let Some(user) = &settings.user {
        let Some(password) = &settings.password else {
            return Err(anyhow!(
                "Password is required for SQL authentication (user: {})",
                user
            ));
        };
        config.authentication(tiberius::AuthMethod::sql_server(user, password));
    }

    config.encryption(if settings.encrypt {
        tiberius::EncryptionLevel::Required
    } else {
        tiberius::EncryptionLevel::NotSupported
    });

    if settings.trust_cert {
        config.trust_cert();
    }

    Ok(config)
}
