//! Reusable test content.

/// API key the CLI tests hand to the binary
pub const TEST_API_KEY: &str = "hc-cli-test-key";

/// Storage key the fake `az` reports
pub const FAKE_STORAGE_KEY: &str = "fake-storage-key";

pub const COLLECTOR_CONFIG_X: &str = "receivers:\n  otlp:\n    protocols:\n      http:\n";

pub const COLLECTOR_CONFIG_Y: &str =
    "receivers:\n  otlp:\n    protocols:\n      http:\n      grpc:\n";

pub const STACK_TOML: &str = r#"[stack]
name = "ci"
location = "westeurope"

[collector]
config_file = "config.yaml"
"#;

/// `az` stand-in. Every invocation is appended to `calls.log` next to the
/// script; container app YAML passed via `--yaml` is appended to `app.log`.
pub const FAKE_AZ: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
echo "$@" >> "$dir/calls.log"
prev=""
for arg in "$@"; do
  if [ "$prev" = "--yaml" ]; then cat "$arg" >> "$dir/app.log"; fi
  prev="$arg"
done
case "$1 $2 $3 $4" in
  "storage account keys list") echo '[{"keyName":"key1","value":"fake-storage-key"}]' ;;
  "storage file upload"*) echo '' ;;
  *delete*|*remove*) echo '' ;;
  *) echo '{"id":"/fake/'"$1-$2"'","properties":{"defaultDomain":"happy.westeurope.azurecontainerapps.io","latestRevisionName":"collector--abc","configuration":{"ingress":{"fqdn":"collector.happy.westeurope.azurecontainerapps.io"}}}}' ;;
esac
"#;
