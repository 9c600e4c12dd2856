//! JSON structured logging shared by every binary in the workspace.
//!
//! Logs go to stderr, one JSON object per line, so they never interleave with
//! program output on stdout.

use std::{fmt, io, sync::Arc};

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing_subscriber::{
    fmt::{self as tsfmt, format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    EnvFilter, Registry,
};

#[derive(Debug, thiserror::Error)]
pub enum ObsInitError {
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize logging for a component.
pub struct ObsInit;

impl ObsInit {
    /// Install the global JSON subscriber writing to stderr.
    pub fn init(service: &str) -> Result<(), ObsInitError> {
        let subscriber = Self::subscriber_with_writer(service, io::stderr);
        tracing::subscriber::set_global_default(subscriber).map_err(|err| {
            if tracing::dispatcher::has_been_set() {
                ObsInitError::AlreadyInitialized
            } else {
                ObsInitError::Install(err)
            }
        })
    }

    /// Build the subscriber with a custom writer.
    ///
    /// The filter comes from `RUST_LOG`, then `LOG_LEVEL`, then `debug` for
    /// debug builds and `info` otherwise.
    pub fn subscriber_with_writer<W>(service: &str, writer: W) -> impl tracing::Subscriber
    where
        W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    {
        let env_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(env_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = tsfmt::layer()
            .with_ansi(false)
            .event_format(JsonLineFormat::new(Arc::from(service)))
            .with_writer(writer);

        Registry::default().with(env_filter).with(fmt_layer)
    }
}

struct JsonLineFormat {
    service: Arc<str>,
}

impl JsonLineFormat {
    fn new(service: Arc<str>) -> Self {
        Self { service }
    }
}

impl<S, N> FormatEvent<S, N> for JsonLineFormat
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let spans: Vec<Value> = ctx
            .event_scope()
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| Value::from(span.name()))
                    .collect()
            })
            .unwrap_or_default();

        let mut line = Map::new();
        line.insert(
            "level".into(),
            metadata.level().as_str().to_ascii_lowercase().into(),
        );
        line.insert("target".into(), metadata.target().into());
        line.insert("service".into(), Value::from(&*self.service));
        line.insert("spans".into(), Value::Array(spans));
        line.insert("fields".into(), Value::Object(visitor.fields));

        writeln!(writer, "{}", Value::Object(line))
    }
}

#[derive(Default)]
struct JsonFieldVisitor {
    fields: Map<String, Value>,
}

impl Visit for JsonFieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}").into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields
            .insert(field.name().to_string(), value.to_string().into());
    }
}
