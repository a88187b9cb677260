use dotenv::dotenv;
use feed_courier::bot::update_handler;

fn main() {
    dotenv().ok();
    env_logger::init();

    update_handler::start_bot();
}
