fn main() {
    if let Err(err) = video_timer_lib::run() {
        eprintln!("video-timer: {err:#}");
        std::process::exit(1);
    }
}
