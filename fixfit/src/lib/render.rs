//! Turns a [`RunLog`] into the line-oriented console report.
//!
//! Wording is presentation only. What matters is that every fact
//! (which partitions were skipped, where each job went, how full each
//! partition ended up) is taken straight from the log.
use crate::utils::*;
use crate::sim::{RunLog, Step, Summary};

pub fn job_list(jobs: &[Job]) -> String {
    format!("Jobs with sizes (KB): [{}]",
        jobs.iter()
            .map(|j| format!("({}, {})", j.id(), j.size()))
            .join(", ")
    )
}

pub fn snapshot_line(s: &PartitionSnapshot) -> String {
    format!("Partition {}: {}KB, Used: {}KB, Free: {}KB", s.id, s.capacity, s.used, s.free)
}

pub fn step_lines(step: &Step) -> Vec<String> {
    let p = &step.placement;
    let (id, size) = (p.job.id(), p.job.size());
    let mut res = vec![
        String::new(),
        format!("Allocating memory for Job {} ({}KB):", id, size),
    ];
    res.extend(p.skipped
        .iter()
        .map(|s| format!("Partition {} does not have enough space for Job {} ({}KB).", s.partition, id, size))
    );
    res.push(match &p.verdict {
        Verdict::Placed { partition, .. }   => {
            format!("Job {} ({}KB) allocated to {}.", id, size, partition)
        },
        Verdict::NoFit                      => {
            String::from("Partitions have not enough space.")
        }
    });
    res.extend(step.after.iter().map(snapshot_line));

    res
}

pub fn summary_line(s: &Summary) -> String {
    format!("Placed:\t\t{} jobs\nRejected:\t{} jobs\nUsed:\t\t{}KB of {}KB\nUtilization:\t{:.2}%",
        s.placed,
        s.rejected,
        s.total_used,
        s.total_capacity,
        s.utilization
    )
}

/// The full report, header to summary.
pub fn report(log: &RunLog) -> Vec<String> {
    let jobs: Vec<Job> = log.jobs().copied().collect();
    let mut res = vec![job_list(&jobs)];
    for s in &log.steps {
        res.append(&mut step_lines(s));
    }
    res.push(String::new());
    res.push(summary_line(&log.summary()));

    res
}
