use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::{role::Role, sequencer::SkipReason};

#[derive(Debug, Clone, Copy)]
pub(crate) struct DriverMetrics;

impl DriverMetrics {
    // ################ COUNTERS ################ //

    // ============= L1 / L2 STATE ================ //

    /// Sets the L1 head block number.
    pub(crate) fn set_l1_head_number(value: u64) {
        counter!("driver_l1_head_number").absolute(value);
    }

    /// Sets the L2 unsafe head block number.
    pub(crate) fn set_unsafe_head_number(value: u64) {
        counter!("driver_unsafe_head_number").absolute(value);
    }

    /// Sets the L2 safe head block number.
    pub(crate) fn set_safe_head_number(value: u64) {
        counter!("driver_safe_head_number").absolute(value);
    }

    /// Sets the L1 origin of the L2 unsafe head.
    pub(crate) fn set_head_l1_origin(value: u64) {
        counter!("driver_head_l1_origin").absolute(value);
    }

    /// Increments the amount of L1 reorgs detected, and records their depth.
    pub(crate) fn increment_l1_reorgs(depth: u64) {
        counter!("driver_l1_reorgs").increment(1);
        histogram!("driver_l1_reorg_depth").record(depth as f64);
    }

    /// Increments the amount of L1 reorgs that could not be resolved, by reason.
    pub(crate) fn increment_reorg_resolution_failures(reason: String) {
        counter!("driver_reorg_resolution_failures", "reason" => reason).increment(1);
    }

    // ============= Derivation ================ //

    /// Increments the amount of derivation steps that advanced the safe head.
    pub(crate) fn increment_epoch_steps() {
        counter!("driver_epoch_steps").increment(1);
    }

    /// Increments the amount of derivation step failures by reason.
    pub(crate) fn increment_epoch_step_failures(reason: String) {
        counter!("driver_epoch_step_failures", "reason" => reason).increment(1);
    }

    // ============ L2 BLOCKS ================ //

    /// Increments the amount of L2 blocks built by the driver.
    pub(crate) fn increment_l2_blocks_built() {
        counter!("driver_l2_blocks_built").increment(1);
    }

    /// Increments the amount of catch-up block production requests.
    pub(crate) fn increment_catch_up_blocks() {
        counter!("driver_catch_up_blocks").increment(1);
    }

    /// Increments the amount of block production failures by reason.
    pub(crate) fn increment_block_production_failures(reason: String) {
        counter!("driver_block_production_failures", "reason" => reason).increment(1);
    }

    /// Increments the amount of skipped block production requests by reason.
    pub(crate) fn increment_skipped_blocks(reason: SkipReason) {
        counter!("driver_skipped_blocks", "reason" => reason.to_string()).increment(1);
    }

    // ============= Batches ================ //

    /// Increments the amount of batches submitted by the driver.
    pub(crate) fn increment_batches_submitted() {
        counter!("driver_batches_submitted").increment(1);
    }

    /// Increments the amount of batch submission failures by reason.
    pub(crate) fn increment_batch_submission_failures(reason: String) {
        counter!("driver_batch_submission_failures", "reason" => reason).increment(1);
    }

    // ============= Requests ================ //

    /// Increments the amount of requests absorbed by an already pending one.
    pub(crate) fn increment_coalesced_requests(kind: &'static str) {
        counter!("driver_coalesced_requests", "kind" => kind).increment(1);
    }

    // ################ GAUGES ################ //

    /// Sets the version of the driver.
    pub(crate) fn set_driver_version(tag: String) {
        gauge!("driver_version", "tag" => tag).set(1.0);
    }

    /// Sets the role of the driver.
    pub(crate) fn set_driver_role(role: Role) {
        let displayed = role.to_string();

        for other in Role::variant_names() {
            let other = other.to_string();
            if other == displayed {
                continue;
            }
            gauge!("driver_role", "role" => other).set(0);
        }

        gauge!("driver_role", "role" => displayed).set(1);
    }

    /// Sets the amount of L1 blocks buffered in the window.
    pub(crate) fn set_window_len(len: usize) {
        gauge!("driver_l1_window_len").set(len as f64);
    }

    /// Sets the distance between the L1 head and the L1 origin of the unsafe head.
    pub(crate) fn set_l1_origin_lag(blocks: u64) {
        gauge!("driver_l1_origin_lag").set(blocks as f64);
    }

    // ################ HISTOGRAMS ################ //

    /// Records the time it took to run a derivation step.
    pub(crate) fn record_epoch_step_time(time_elapsed: Duration) {
        histogram!("driver_epoch_step_time").record(time_elapsed.as_secs_f64());
    }

    /// Records the time it took to build an L2 block.
    pub(crate) fn record_block_building_time(time_elapsed: Duration) {
        histogram!("driver_block_building_time").record(time_elapsed.as_secs_f64());
    }

    /// Records the time it took to resolve an L1 reorg.
    pub(crate) fn record_reorg_resolution_time(time_elapsed: Duration) {
        histogram!("driver_reorg_resolution_time").record(time_elapsed.as_secs_f64());
    }

    /// Records the time it took to submit a batch.
    pub(crate) fn record_batch_submission_time(time_elapsed: Duration) {
        histogram!("driver_batch_submission_time").record(time_elapsed.as_secs_f64());
    }
}
