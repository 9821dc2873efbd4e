use clap::{App, Arg};
#[macro_use]
extern crate log;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use uncover::{gen_seq, HiddenMarkovModel, ProbMatrix, ProbVector};

// The classic two-state weather/ice-cream model.
fn weather_model() -> HiddenMarkovModel {
    let init = ProbVector::new(vec![("1H", 0.6), ("2C", 0.4)]).unwrap();
    let trans = ProbMatrix::new(vec![
        ("1H", ProbVector::new(vec![("1H", 0.7), ("2C", 0.3)]).unwrap()),
        ("2C", ProbVector::new(vec![("1H", 0.4), ("2C", 0.6)]).unwrap()),
    ])
    .unwrap();
    let emit = ProbMatrix::new(vec![
        (
            "1H",
            ProbVector::new(vec![("1S", 0.1), ("2M", 0.4), ("3L", 0.5)]).unwrap(),
        ),
        (
            "2C",
            ProbVector::new(vec![("1S", 0.7), ("2M", 0.2), ("3L", 0.1)]).unwrap(),
        ),
    ])
    .unwrap();
    HiddenMarkovModel::new(init, trans, emit).unwrap()
}

fn main() {
    let matches = App::new("uncover")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Sample a sequence from the weather model and decode it back.")
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Debug mode"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("32389")
                .help("Seed"),
        )
        .arg(
            Arg::with_name("length")
                .long("length")
                .takes_value(true)
                .default_value("20")
                .help("Length of the sampled sequence"),
        )
        .get_matches();
    let level = match matches.occurrences_of("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let seed: u64 = matches
        .value_of("seed")
        .and_then(|e| e.parse().ok())
        .unwrap();
    let length: usize = matches
        .value_of("length")
        .and_then(|e| e.parse().ok())
        .unwrap();
    debug!("Start");
    let model = weather_model();
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let (observations, hidden) = gen_seq::sample(&model, length, &mut rng);
    info!("Sampled {} observations with seed {}", length, seed);
    let decoded = match model.uncover(&observations) {
        Ok(decoded) => decoded,
        Err(why) => {
            error!("{}", why);
            std::process::exit(1);
        }
    };
    let hits = decoded
        .iter()
        .zip(hidden.iter())
        .filter(|(d, h)| d == h)
        .count();
    println!("OBS\t{}", observations.join(" "));
    println!("TRUE\t{}", hidden.join(" "));
    println!("DECODED\t{}", decoded.join(" "));
    println!("AGREE\t{}/{}", hits, length);
}
