use {
    clap::{crate_description, crate_name, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand},
    log::*,
    shardnet_systemtests::{
        config::{load_configuration, DEFAULT_CONFIG_PATH},
        scenarios,
        session::Session,
        setup::{self, SetupOptions},
        Result,
    },
    std::{path::Path, process::exit},
};

fn network_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("network")
        .long("network")
        .value_name("NAME")
        .takes_value(true)
        .required(true)
        .help("Name of the network configuration to use")
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("PATH")
                .takes_value(true)
                .global(true)
                .help("Network configurations file [default: systemtests/config.json]"),
        )
        .subcommand(
            SubCommand::with_name("setup")
                .about("Fund the test users and issue the custom currency")
                .arg(network_arg())
                .arg(
                    Arg::with_name("with_token_airdrops")
                        .long("with-token-airdrops")
                        .takes_value(false)
                        .help("Also send the custom currency to every user"),
                )
                .arg(
                    Arg::with_name("with_contract_deployments")
                        .long("with-contract-deployments")
                        .takes_value(false)
                        .help("Also deploy the adder contract in every shard"),
                ),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Run the scenario battery")
                .arg(network_arg())
                .arg(
                    Arg::with_name("without_spica")
                        .long("without-spica")
                        .takes_value(false)
                        .help("Skip scenarios needing relayed v3 and developer rewards"),
                ),
        )
}

fn config_path<'a>(matches: &'a ArgMatches, sub_matches: &'a ArgMatches) -> &'a Path {
    Path::new(
        sub_matches
            .value_of("config")
            .or_else(|| matches.value_of("config"))
            .unwrap_or(DEFAULT_CONFIG_PATH),
    )
}

fn process(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("setup", Some(sub_matches)) => {
            let config = load_configuration(
                config_path(matches, sub_matches),
                sub_matches.value_of("network").unwrap_or_default(),
            )?;
            let options = SetupOptions {
                with_token_airdrops: sub_matches.is_present("with_token_airdrops"),
                with_contract_deployments: sub_matches.is_present("with_contract_deployments"),
            };
            let mut session = Session::connect(&config, options.with_token_airdrops)?;
            setup::run(&mut session.assembler, &session.coordinator, options)
        }
        ("run", Some(sub_matches)) => {
            let config = load_configuration(
                config_path(matches, sub_matches),
                sub_matches.value_of("network").unwrap_or_default(),
            )?;
            let with_spica = !sub_matches.is_present("without_spica");
            let mut session = Session::connect(&config, true)?;
            let hashes = scenarios::run(&mut session.assembler, &session.coordinator, with_spica)?;
            info!("Done, {} transactions submitted", hashes.len());
            Ok(())
        }
        _ => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = app().get_matches();
    if let Err(err) = process(&matches) {
        error!("{err}");
        exit(1);
    }
}
