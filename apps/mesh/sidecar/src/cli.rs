use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "gRPC helper for services behind a mesh sidecar")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve health and reflection until interrupted
    Serve(ServeArgs),
    /// Query the health of a gRPC target
    Check(CheckArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Bind address; falls back to GRPC_HOST / GRPC_PORT
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Service name reported through health; falls back to GRPC_SERVICE_NAME
    #[arg(short, long)]
    pub name: Option<String>,

    /// Do not register the reflection service
    #[arg(long)]
    pub no_reflection: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CheckArgs {
    /// Target URI, e.g. http://ratings:9080
    #[arg(short, long)]
    pub target: String,

    /// Service to ask about; empty asks about the server as a whole
    #[arg(short, long, default_value = "")]
    pub service: String,

    /// Give up after this many milliseconds
    #[arg(long, default_value_t = 3000)]
    pub timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let args = Args::parse_from(["mesh_sidecar", "serve", "--addr", "0.0.0.0:9080", "-n", "ratings"]);
        let Command::Serve(serve) = args.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.addr.as_deref(), Some("0.0.0.0:9080"));
        assert_eq!(serve.name.as_deref(), Some("ratings"));
        assert!(!serve.no_reflection);
    }

    #[test]
    fn test_parse_check_defaults() {
        let args = Args::parse_from(["mesh_sidecar", "check", "--target", "http://ratings:9080"]);
        let Command::Check(check) = args.command else {
            panic!("expected check");
        };
        assert_eq!(check.target, "http://ratings:9080");
        assert_eq!(check.service, "");
        assert_eq!(check.timeout_ms, 3000);
    }

    #[test]
    fn test_check_requires_target() {
        assert!(Args::try_parse_from(["mesh_sidecar", "check"]).is_err());
    }
}
