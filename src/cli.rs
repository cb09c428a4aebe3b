use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zipcodec")]
#[command(version)]
#[command(about = "A streaming ZIP archive reader and writer", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipcodec pack assets assets.zip -l 9   compress the assets folder\n  \
  zipcodec unpack assets.zip -d out      extract into the out folder\n  \
  zipcodec list -v assets.zip            list entries with details")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress the contents of a folder into a zip file
    Pack {
        /// Folder whose contents are archived
        folder: PathBuf,

        /// Output zip file path
        archive: PathBuf,

        /// Compression level (0 = none, 9 = best)
        #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,
    },

    /// Extract a zip file into a folder
    Unpack {
        /// Zip file to extract
        archive: PathBuf,

        /// Extract files into DIR (default: current directory)
        #[arg(short = 'd', value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// List the entries of a zip file
    List {
        /// Zip file to inspect
        archive: PathBuf,

        /// List verbosely (sizes, ratio, timestamps)
        #[arg(short = 'v')]
        verbose: bool,
    },
}
