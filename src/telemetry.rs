use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

/// Initialise tracing avec un filtre optionnel et un mode JSON conditionnel.
///
/// Le filtre retenu est le premier valide parmi `explicit_filter`, `RUST_LOG`
/// puis `info`.
///
/// # Errors
///
/// Retourne une erreur si aucun filtre n'est valide, si la couche JSON est
/// demandée alors que la fonctionnalité n'est pas compilée, ou si l'installation
/// du subscriber global échoue.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = resolve_filter(explicit_filter, std::env::var("RUST_LOG").ok())?;

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()))?;
        return Ok(());
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

fn resolve_filter(explicit: Option<&str>, env: Option<String>) -> Result<EnvFilter> {
    explicit
        .map(str::to_string)
        .into_iter()
        .chain(env)
        .chain(std::iter::once("info".to_string()))
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))
}

#[cfg(test)]
mod tests {
    use super::resolve_filter;

    #[test]
    fn invalid_explicit_filter_falls_back() {
        let filter = match resolve_filter(Some("toastify=[[["), Some("toastify=debug".into())) {
            Ok(filter) => filter,
            Err(err) => panic!("expected a fallback filter: {err}"),
        };
        assert!(filter.to_string().contains("debug"));
    }
}
