// GitLab merge-request change source (thin I/O glue)

mod client;

pub use client::{GitLabClient, MergeRequestChanges, MergeRequestRef};
