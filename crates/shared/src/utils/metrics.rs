use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::metrics::{counter::Counter, family::Family, gauge::Gauge};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use std::sync::{Arc, atomic::AtomicU64};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource usage of this process only; host-wide figures belong to node exporters.
#[derive(Debug, Clone, Default)]
pub struct ProcessMetrics {
    pub resident_memory_bytes: Gauge,
    pub virtual_memory_bytes: Gauge,
    pub cpu_usage_percent: Gauge<f64, AtomicU64>,
    pub threads: Gauge,
    pub start_time_seconds: Gauge,
}

impl ProcessMetrics {
    pub fn register(&self, registry: &mut Registry) {
        let process = registry.sub_registry_with_prefix("process");

        process.register(
            "resident_memory_bytes",
            "Resident set size in bytes",
            self.resident_memory_bytes.clone(),
        );
        process.register(
            "virtual_memory_bytes",
            "Virtual memory size in bytes",
            self.virtual_memory_bytes.clone(),
        );
        process.register(
            "cpu_usage_percent",
            "CPU usage since the previous sample",
            self.cpu_usage_percent.clone(),
        );
        process.register("threads", "OS threads of the process", self.threads.clone());
        process.register(
            "start_time_seconds",
            "Start time of the process since unix epoch in seconds",
            self.start_time_seconds.clone(),
        );
    }

    fn sample(&self, sys: &mut System, pid: Pid) {
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu().with_tasks(),
        );

        let Some(process) = sys.process(pid) else {
            return;
        };

        self.resident_memory_bytes.set(process.memory() as i64);
        self.virtual_memory_bytes.set(process.virtual_memory() as i64);
        self.cpu_usage_percent.set(f64::from(process.cpu_usage()));
        self.start_time_seconds.set(process.start_time() as i64);
        if let Some(tasks) = process.tasks() {
            self.threads.set(tasks.len() as i64);
        }
    }
}

/// Samples [`ProcessMetrics`] every 15 seconds. CPU usage needs the previous
/// sample, so one `System` lives for the whole loop.
pub async fn run_metrics_collector(process_metrics: Arc<ProcessMetrics>) {
    let pid = Pid::from_u32(std::process::id());
    let mut sys = System::new();
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(15));

    loop {
        interval.tick().await;
        process_metrics.sample(&mut sys, pid);
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Success,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationLabels {
    pub operation: String,
    pub outcome: Outcome,
}

/// Per-operation call counts and latencies of one service.
#[derive(Clone, Debug)]
pub struct Metrics {
    pub calls: Family<OperationLabels, Counter>,
    pub duration: Family<OperationLabels, Histogram>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            calls: Family::default(),
            duration: Family::new_with_constructor(|| {
                Histogram::new([0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5])
            }),
        }
    }

    pub fn register(&self, registry: &mut Registry, service: &str) {
        registry.register(
            format!("{service}_calls"),
            format!("Operations handled by the {service}"),
            self.calls.clone(),
        );
        registry.register(
            format!("{service}_duration_seconds"),
            format!("Operation latency of the {service}"),
            self.duration.clone(),
        );
    }

    pub fn record(&self, operation: &str, outcome: Outcome, duration_secs: f64) {
        let labels = OperationLabels {
            operation: operation.to_string(),
            outcome,
        };
        self.calls.get_or_create(&labels).inc();
        self.duration.get_or_create(&labels).observe(duration_secs);
    }

    pub fn calls_of(&self, operation: &str, outcome: Outcome) -> u64 {
        self.calls
            .get_or_create(&OperationLabels {
                operation: operation.to_string(),
                outcome,
            })
            .get()
    }
}
