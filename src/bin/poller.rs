use dotenv::dotenv;
use feed_courier::sync::PollJob;
use feed_courier::Config;
use std::thread;
use std::time::Duration;

fn main() {
    dotenv().ok();
    env_logger::init();

    let interval = Duration::from_secs(Config::poll_interval_seconds());

    // Runs execute back to back on a single thread, so two checks can
    // never overlap even when a run takes longer than the interval.
    loop {
        if let Err(error) = PollJob::new().execute() {
            log::error!("Feed check run failed: {}", error.msg);
        }

        thread::sleep(interval);
    }
}
