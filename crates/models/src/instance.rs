//! State shared by every reference model instance.

use strand_core::{Callbacks, InstanceKind, Instantiate, LogMessage, Status, ValueReference};

const EVENTS: &str = "logEvents";
const ERRORS: &str = "logStatusError";

/// Name, logging setup and current time of an instance.
#[derive(Debug)]
pub(crate) struct Base {
    name: String,
    callbacks: Callbacks,
    logging_on: bool,
    categories: Vec<String>,
    pub(crate) time: f64,
}

impl Base {
    /// Accepts a Model Exchange request carrying the expected GUID.
    pub(crate) fn new(request: &Instantiate<'_>, guid: &str) -> Option<Self> {
        let base = Self {
            name: request.instance_name.to_owned(),
            callbacks: request.callbacks.clone(),
            logging_on: request.logging_on,
            categories: Vec::new(),
            time: 0.0,
        };

        if request.kind != InstanceKind::ModelExchange {
            base.error("only Model Exchange instances are supported");
            return None;
        }
        if request.guid != guid {
            base.error(&format!("wrong GUID `{}`, expected `{guid}`", request.guid));
            return None;
        }

        Some(base)
    }

    pub(crate) fn set_debug_logging(&mut self, logging_on: bool, categories: &[String]) -> Status {
        self.logging_on = logging_on;
        self.categories = categories.to_vec();
        Status::Ok
    }

    /// Reports an event if event logging is enabled.
    pub(crate) fn event(&self, message: &str) {
        if self.enabled(EVENTS) {
            self.emit(Status::Ok, EVENTS, message);
        }
    }

    /// Reports an error regardless of the logging setup.
    pub(crate) fn error(&self, message: &str) -> Status {
        self.emit(Status::Error, ERRORS, message);
        Status::Error
    }

    /// Copies `source` into `target`, failing on a length mismatch.
    pub(crate) fn copy(&self, what: &str, target: &mut [f64], source: &[f64]) -> Status {
        if target.len() != source.len() {
            return self.error(&format!(
                "expected {} {what}, got {}",
                source.len(),
                target.len()
            ));
        }
        target.copy_from_slice(source);
        Status::Ok
    }

    /// Fills `values` by looking up each reference.
    pub(crate) fn fetch<T>(
        &self,
        references: &[ValueReference],
        values: &mut [T],
        lookup: impl Fn(ValueReference) -> Option<T>,
    ) -> Status {
        if references.len() != values.len() {
            return self.error("value and reference counts differ");
        }
        for (value, &reference) in values.iter_mut().zip(references) {
            match lookup(reference) {
                Some(found) => *value = found,
                None => return self.error(&format!("unknown value reference {reference}")),
            }
        }
        Status::Ok
    }

    fn enabled(&self, category: &str) -> bool {
        self.logging_on
            && (self.categories.is_empty() || self.categories.iter().any(|c| c == category))
    }

    fn emit(&self, status: Status, category: &str, message: &str) {
        self.callbacks.log(&LogMessage {
            instance_name: &self.name,
            status,
            category,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn collecting(logging_on: bool) -> (Base, Arc<Mutex<Vec<(Status, String)>>>) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let callbacks = Callbacks::new(move |message: &LogMessage<'_>| {
            sink.lock()
                .unwrap()
                .push((message.status, format!("{}: {}", message.category, message.message)));
        });
        let request = Instantiate {
            instance_name: "unit",
            kind: InstanceKind::ModelExchange,
            guid: "{g}",
            resource_location: None,
            callbacks,
            visible: false,
            logging_on,
        };
        (Base::new(&request, "{g}").unwrap(), messages)
    }

    #[test]
    fn events_follow_the_logging_setup() {
        let (mut base, messages) = collecting(false);
        base.event("hidden");
        assert!(messages.lock().unwrap().is_empty());

        base.set_debug_logging(true, &["logStatusError".into()]);
        base.event("still hidden");
        assert!(messages.lock().unwrap().is_empty());

        base.set_debug_logging(true, &[]);
        base.event("shown");
        assert_eq!(
            *messages.lock().unwrap(),
            [(Status::Ok, "logEvents: shown".to_owned())]
        );
    }

    #[test]
    fn errors_are_always_reported() {
        let (base, messages) = collecting(false);
        let mut target = [0.0; 2];
        assert_eq!(base.copy("states", &mut target, &[1.0]), Status::Error);
        assert_eq!(
            *messages.lock().unwrap(),
            [(Status::Error, "logStatusError: expected 1 states, got 2".to_owned())]
        );
    }

    #[test]
    fn fetch_rejects_unknown_references() {
        let (base, _) = collecting(false);
        let lookup = |reference: ValueReference| (reference.0 == 0).then_some(4.0);

        let mut values = [0.0];
        assert_eq!(base.fetch(&[ValueReference(0)], &mut values, lookup), Status::Ok);
        assert_eq!(values, [4.0]);
        assert_eq!(base.fetch(&[ValueReference(7)], &mut values, lookup), Status::Error);
        assert_eq!(base.fetch(&[], &mut values, lookup), Status::Error);
    }

    #[test]
    fn rejects_foreign_requests() {
        let request = Instantiate {
            instance_name: "unit",
            kind: InstanceKind::CoSimulation,
            guid: "{g}",
            resource_location: None,
            callbacks: Callbacks::new(|_: &LogMessage<'_>| {}),
            visible: false,
            logging_on: false,
        };
        assert!(Base::new(&request, "{g}").is_none());

        let request = Instantiate {
            kind: InstanceKind::ModelExchange,
            guid: "{other}",
            ..request
        };
        assert!(Base::new(&request, "{g}").is_none());
    }
}
