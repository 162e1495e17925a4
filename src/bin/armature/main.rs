//! Armature CLI - skeleton inspection tool.
//!
//! Usage: armature <COMMAND> [OPTIONS]
//!
//! Run `armature --help` for available commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use armature::skeleton::{load_skeleton, Skeleton, Template};

#[derive(Parser)]
#[command(name = "armature")]
#[command(author, version, about = "Skeleton inspection CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full and compressed joint tables of a skeleton
    Skeleton {
        /// Built-in template to inspect
        #[arg(value_enum, required_unless_present = "file", conflicts_with = "file")]
        template: Option<TemplateArg>,

        /// Joint-list file to load instead of a template
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Uniform scale applied before printing
        #[arg(short, long)]
        scale: Option<f64>,
    },

    /// List the built-in templates
    Templates,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TemplateArg {
    /// Biped with arms and legs
    Human,
    /// Quadruped with neck and tail
    Quad,
    /// Quadruped with heeled hind legs
    Horse,
    /// Quadruped body with a human torso
    Centaur,
}

impl From<TemplateArg> for Template {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Human => Template::Human,
            TemplateArg::Quad => Template::Quad,
            TemplateArg::Horse => Template::Horse,
            TemplateArg::Centaur => Template::Centaur,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Skeleton {
            template,
            file,
            scale,
        } => {
            let mut skeleton = match (template, file) {
                (_, Some(path)) => load_skeleton(&path)?,
                (Some(template), None) => Template::from(template).build()?,
                (None, None) => return Err("either a template or --file is required".into()),
            };
            if let Some(factor) = scale {
                skeleton.scale(factor);
            }
            print_skeleton(&skeleton);
        }

        Commands::Templates => {
            for template in Template::ALL {
                let skeleton = template.build()?;
                println!(
                    "{:<8} {:>3} joints, {:>3} compressed",
                    template.name(),
                    skeleton.num_joints(),
                    skeleton.num_compressed()
                );
            }
        }
    }

    Ok(())
}

fn print_skeleton(skeleton: &Skeleton) {
    let name = |joint: usize| skeleton.joint_name(joint).unwrap_or("?");

    println!("Full joints: {}", skeleton.num_joints());
    for (joint, p) in skeleton.f_graph().verts.iter().enumerate() {
        let parent = skeleton.f_prev()[joint].map_or("-", name);
        let fraction = skeleton.fc_fraction()[joint]
            .map(|f| format!("{:.3}", f))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>3} {:<12} ({:7.3}, {:7.3}, {:7.3})  parent {:<12} fraction {}",
            joint, name(joint), p.x, p.y, p.z, parent, fraction
        );
    }

    println!("Compressed joints: {}", skeleton.num_compressed());
    for (c, &full) in skeleton.cf_map().iter().enumerate() {
        let parent = skeleton.c_prev()[c].map_or("-", |p| name(skeleton.cf_map()[p]));
        let mirror = skeleton.c_sym()[c].map_or("-", |s| name(skeleton.cf_map()[s]));
        let mut tags = Vec::new();
        if skeleton.c_feet()[c] {
            tags.push("foot");
        }
        if skeleton.c_fat()[c] {
            tags.push("fat");
        }
        println!(
            "  {:>3} {:<12} parent {:<12} length {:7.3}  mirror {:<12} {}",
            c,
            name(full),
            parent,
            skeleton.c_length()[c],
            mirror,
            tags.join(",")
        );
    }
}
