use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Shows a spinner for each slow step when progress output is enabled.
pub struct Steps<'a> {
    multi: Option<&'a MultiProgress>,
}

impl<'a> Steps<'a> {
    pub fn new(multi: Option<&'a MultiProgress>) -> Self {
        Self { multi }
    }

    fn spinner(&self, msg: &str) -> Result<Option<ProgressBar>> {
        let Some(multi) = self.multi else {
            return Ok(None);
        };

        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} {msg} | elapsed: {elapsed_precise}",
        )?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message(msg.to_string());

        Ok(Some(pb))
    }

    /// Runs `step`, with a spinner labelled `msg` while it is in progress.
    pub fn run<T>(&self, msg: &str, step: impl FnOnce() -> Result<T>) -> Result<T> {
        let pb = self.spinner(msg)?;
        let started = std::time::Instant::now();

        let result = step();

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        log::debug!("{msg} took {:.3}s", started.elapsed().as_secs_f64());

        result
    }
}

#[test]
fn runs_without_progress() -> Result<()> {
    let steps = Steps::new(None);
    assert_eq!(steps.run("Adding", || Ok(2 + 2))?, 4);
    assert!(steps.run("Failing", || -> Result<()> { anyhow::bail!("nope") }).is_err());
    Ok(())
}
