use indicatif::{ProgressBar, ProgressStyle};

pub fn job_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(job_bar_style());
    bar.set_prefix("stencils");
    bar
}

fn job_bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:<10} {bar:40.cyan/blue} {pos}/{len} files [{elapsed_precise}] {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}
