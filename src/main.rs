use hdlprobe::{config::Config, run, Opts};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    clilog::init_stderr_color_debug();

    let opts = Opts::parse();
    let mut config = Config::load();
    if let Some(level) = opts.log_level() {
        config.set_log_level(level);
    }
    clilog::log::set_max_level(config.get_log_level());

    println!("{}", run(opts, &config)?);

    Ok(())
}
