use crate::error::{Error, Result};
use crate::parse::parse_verdicts;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use sessionctl_types::Verdict;
use std::time::Duration;

/// Captured output of one worker invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Abstracts "run this external command and collect its output" so the
/// dispatch logic below can be exercised with a fake in tests, without
/// actually invoking an agent CLI binary.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(&'a self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, std::io::Result<ProcessOutput>>;
}

/// Production runner: shells out via `tokio::process`.
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    fn run<'a>(&'a self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, std::io::Result<ProcessOutput>> {
        Box::pin(async move {
            let output = tokio::process::Command::new(program).args(args).output().await?;
            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                success: output.status.success(),
            })
        })
    }
}

/// One unit of work: the prompt text plus however the caller wants it
/// delivered as process args (each dialect's non-interactive entrypoint
/// takes the prompt differently, e.g. `-p <prompt>` vs positional).
pub struct ChunkJob {
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
}

/// Dispatch a single chunk job with a per-chunk deadline (spec §4.5
/// "Cancellation/timeout"). An expired or failed chunk contributes no
/// verdicts; the error is returned so the caller can log it, but it must
/// never fail the overall operation.
pub async fn dispatch_one(runner: &dyn CommandRunner, job: &ChunkJob, deadline: Duration) -> Result<Vec<Verdict>> {
    let fut = runner.run(&job.program, &job.args);
    match tokio::time::timeout(deadline, fut).await {
        Err(_) => Err(Error::Timeout),
        Ok(Err(io_err)) => Err(Error::Io(io_err)),
        Ok(Ok(output)) => {
            if !output.success && output.stdout.trim().is_empty() {
                return Err(Error::Unparseable(output.stderr));
            }
            parse_verdicts(&output.stdout)
        }
    }
}

/// Mode 1 of spec §4.5: fan out every chunk job concurrently, bounded by
/// `concurrency` in-flight tasks at once (a bounded task pool standing in
/// for the teacher's cooperative-async fan-out, per the REDESIGN FLAGS —
/// the verdict contract is a set union, so task interleaving never changes
/// the result). Failed/timed-out chunks resolve to an empty verdict list
/// rather than aborting the batch.
pub async fn dispatch_parallel(
    runner: &dyn CommandRunner,
    jobs: Vec<ChunkJob>,
    deadline: Duration,
    concurrency: usize,
) -> Vec<Vec<Verdict>> {
    let concurrency = concurrency.max(1);
    stream::iter(jobs)
        .map(|job| async move {
            match dispatch_one(runner, &job, deadline).await {
                Ok(verdicts) => verdicts,
                Err(err) => {
                    tracing::warn!(chunk = %job.label, error = %err, "analysis chunk produced no verdicts");
                    Vec::new()
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeRunner {
        reply: String,
        calls: Arc<AtomicUsize>,
    }

    impl CommandRunner for FakeRunner {
        fn run<'a>(&'a self, _program: &'a str, _args: &'a [String]) -> BoxFuture<'a, std::io::Result<ProcessOutput>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.reply.clone();
            Box::pin(async move { Ok(ProcessOutput { stdout: reply, stderr: String::new(), success: true }) })
        }
    }

    #[tokio::test]
    async fn dispatch_parallel_unions_all_chunk_verdicts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = FakeRunner { reply: "[1, 2]".to_string(), calls: calls.clone() };
        let jobs = (0..5)
            .map(|i| ChunkJob { label: format!("chunk-{i}"), program: "fake".into(), args: vec![] })
            .collect();

        let results = dispatch_parallel(&runner, jobs, Duration::from_secs(5), 3).await;
        assert_eq!(results.len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(results.iter().all(|v| v.len() == 2));
    }

    struct HangingRunner;
    impl CommandRunner for HangingRunner {
        fn run<'a>(&'a self, _program: &'a str, _args: &'a [String]) -> BoxFuture<'a, std::io::Result<ProcessOutput>> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!()
            })
        }
    }

    #[tokio::test]
    async fn timeout_yields_no_verdicts_without_failing_batch() {
        let runner = HangingRunner;
        let jobs = vec![ChunkJob { label: "slow".into(), program: "fake".into(), args: vec![] }];
        let results = dispatch_parallel(&runner, jobs, Duration::from_millis(20), 1).await;
        assert_eq!(results, vec![Vec::new()]);
    }
}
