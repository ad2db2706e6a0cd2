// Infrastructure status domain model (opaque metadata shown next to the chart)

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceSchedule {
    pub job_name: String,
    pub cron_expression: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfraStatus {
    pub engine_name: String,
    pub active_partitions: Vec<String>,
    pub maintenance_schedule: MaintenanceSchedule,
    pub infra_cost: String,
}

impl InfraStatus {
    pub fn new(
        engine_name: String,
        active_partitions: Vec<String>,
        maintenance_schedule: MaintenanceSchedule,
        infra_cost: String,
    ) -> Self {
        Self {
            engine_name,
            active_partitions,
            maintenance_schedule,
            infra_cost,
        }
    }
}
