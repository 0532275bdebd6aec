use serde::Deserialize;

use crate::playback::events::{EngineEvent, MEDIA_ERR_SRC_NOT_SUPPORTED};

const OBSERVE_DURATION: i64 = 1;
const OBSERVE_TIME_POS: i64 = 2;
const OBSERVE_EOF: i64 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct MpvEvent {
    pub event: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub file_error: Option<String>,
}

/// Maps raw mpv notifications onto engine events. Anything unrelated to
/// playback progress is dropped.
pub fn translate(event: &MpvEvent) -> Option<EngineEvent> {
    match event.event.as_str() {
        "property-change" => {
            let data = event.data.as_ref()?;
            match event.id? {
                OBSERVE_DURATION => data
                    .as_f64()
                    .map(|duration| EngineEvent::MetadataReady { duration }),
                OBSERVE_TIME_POS => data
                    .as_f64()
                    .map(|position| EngineEvent::TimeAdvanced { position }),
                OBSERVE_EOF => data
                    .as_bool()
                    .filter(|&eof| eof)
                    .map(|_| EngineEvent::Ended),
                _ => None,
            }
        }
        "end-file" => match event.reason.as_deref() {
            Some("eof") => Some(EngineEvent::Ended),
            Some("error") => Some(EngineEvent::Error {
                code: MEDIA_ERR_SRC_NOT_SUPPORTED,
                message: event
                    .file_error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            }),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(unix)]
mod unix {
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::path::PathBuf;
    use std::process::{Child, Command, Stdio};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
    use tokio::net::UnixStream;
    use tokio::sync::mpsc;
    use tracing::{debug, warn};

    use super::{translate, MpvEvent, OBSERVE_DURATION, OBSERVE_EOF, OBSERVE_TIME_POS};
    use crate::playback::engine::PlaybackEngine;
    use crate::playback::events::EngineEvent;

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum MpvMessage {
        Event(MpvEvent),
        Reply {
            error: String,
            #[serde(default)]
            request_id: Option<i64>,
        },
    }

    pub struct MpvEngine {
        socket_path: PathBuf,
        process: Child,
        writer: BufWriter<tokio::net::unix::OwnedWriteHalf>,
        event_rx: mpsc::Receiver<EngineEvent>,
    }

    pub fn check_dependencies() -> Result<()> {
        if Command::new("mpv")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_err()
        {
            anyhow::bail!(
                "mpv not found. Install it:\n\n  \
                 Ubuntu/Debian: sudo apt install mpv\n  \
                 Arch:          sudo pacman -S mpv\n  \
                 Fedora:        sudo dnf install mpv\n  \
                 macOS:         brew install mpv\n"
            );
        }
        Ok(())
    }

    impl MpvEngine {
        pub async fn spawn() -> Result<Self> {
            check_dependencies()?;

            let socket_path =
                std::env::temp_dir().join(format!("playnav-mpv-{}.sock", std::process::id()));
            let _ = std::fs::remove_file(&socket_path);

            let process = Command::new("mpv")
                .args([
                    "--idle=yes",
                    "--keep-open=yes",
                    "--no-video",
                    "--no-terminal",
                    "--really-quiet",
                    &format!("--input-ipc-server={}", socket_path.display()),
                ])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .context("Failed to spawn mpv")?;

            let mut connected = false;
            for _ in 0..50 {
                if socket_path.exists() {
                    connected = true;
                    break;
                }
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            }

            if !connected {
                anyhow::bail!("mpv socket did not appear at {}", socket_path.display());
            }

            let stream = UnixStream::connect(&socket_path)
                .await
                .context("Failed to connect to mpv socket")?;

            let (reader, writer) = stream.into_split();
            let (event_tx, event_rx) = mpsc::channel(64);
            tokio::spawn(Self::read_events(BufReader::new(reader), event_tx));

            let mut engine = Self {
                socket_path,
                process,
                writer: BufWriter::new(writer),
                event_rx,
            };

            engine.observe(OBSERVE_DURATION, "duration").await?;
            engine.observe(OBSERVE_TIME_POS, "time-pos").await?;
            engine.observe(OBSERVE_EOF, "eof-reached").await?;

            debug!("mpv ready on {}", engine.socket_path.display());
            Ok(engine)
        }

        async fn read_events(
            mut reader: BufReader<tokio::net::unix::OwnedReadHalf>,
            event_tx: mpsc::Sender<EngineEvent>,
        ) {
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => match serde_json::from_str::<MpvMessage>(&line) {
                        Ok(MpvMessage::Event(event)) => {
                            if let Some(event) = translate(&event) {
                                if event_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Ok(MpvMessage::Reply { error, request_id }) if error != "success" => {
                            warn!("mpv rejected request {:?}: {}", request_id, error);
                        }
                        Ok(MpvMessage::Reply { .. }) => {}
                        Err(e) => debug!("ignoring mpv line: {}", e),
                    },
                    Err(e) => {
                        warn!("mpv socket closed: {}", e);
                        break;
                    }
                }
            }
        }

        async fn send_command(&mut self, cmd: Vec<serde_json::Value>) -> Result<()> {
            let msg = json!({ "command": cmd });
            let line = format!("{}\n", msg);
            self.writer
                .write_all(line.as_bytes())
                .await
                .context("Failed to write to mpv")?;
            self.writer.flush().await.context("Failed to flush mpv socket")?;
            Ok(())
        }

        async fn observe(&mut self, id: i64, property: &str) -> Result<()> {
            self.send_command(vec![json!("observe_property"), json!(id), json!(property)])
                .await
        }

        async fn set_property(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
            self.send_command(vec![json!("set_property"), json!(name), value])
                .await
        }

        pub async fn quit(&mut self) -> Result<()> {
            self.send_command(vec![json!("quit")]).await
        }
    }

    #[async_trait]
    impl PlaybackEngine for MpvEngine {
        async fn load(&mut self, source: &str) -> Result<()> {
            self.send_command(vec![json!("loadfile"), json!(source), json!("replace")])
                .await
        }

        async fn play(&mut self) -> Result<()> {
            self.set_property("pause", json!(false)).await
        }

        async fn pause(&mut self) -> Result<()> {
            self.set_property("pause", json!(true)).await
        }

        async fn seek_to(&mut self, seconds: f64) -> Result<()> {
            self.send_command(vec![json!("seek"), json!(seconds), json!("absolute")])
                .await
        }

        async fn set_volume(&mut self, volume: f64) -> Result<()> {
            self.set_property("volume", json!(volume.clamp(0.0, 1.0) * 100.0))
                .await
        }

        async fn set_muted(&mut self, muted: bool) -> Result<()> {
            self.set_property("mute", json!(muted)).await
        }

        fn try_next_event(&mut self) -> Option<EngineEvent> {
            self.event_rx.try_recv().ok()
        }
    }

    impl Drop for MpvEngine {
        fn drop(&mut self) {
            let _ = self.process.kill();
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

#[cfg(unix)]
pub use unix::MpvEngine;

#[cfg(not(unix))]
pub struct MpvEngine;

#[cfg(not(unix))]
impl MpvEngine {
    pub async fn spawn() -> anyhow::Result<Self> {
        anyhow::bail!("Playback is only supported on Unix systems (Linux/macOS)")
    }

    pub async fn quit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
#[async_trait::async_trait]
impl crate::playback::engine::PlaybackEngine for MpvEngine {
    async fn load(&mut self, _source: &str) -> anyhow::Result<()> {
        Ok(())
    }
    async fn play(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    async fn pause(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    async fn seek_to(&mut self, _seconds: f64) -> anyhow::Result<()> {
        Ok(())
    }
    async fn set_volume(&mut self, _volume: f64) -> anyhow::Result<()> {
        Ok(())
    }
    async fn set_muted(&mut self, _muted: bool) -> anyhow::Result<()> {
        Ok(())
    }
    fn try_next_event(&mut self) -> Option<EngineEvent> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> MpvEvent {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_translate_properties() {
        let duration = parse(r#"{"event":"property-change","id":1,"name":"duration","data":182.5}"#);
        assert_eq!(translate(&duration), Some(EngineEvent::MetadataReady { duration: 182.5 }));

        let pos = parse(r#"{"event":"property-change","id":2,"name":"time-pos","data":3.25}"#);
        assert_eq!(translate(&pos), Some(EngineEvent::TimeAdvanced { position: 3.25 }));

        let unset = parse(r#"{"event":"property-change","id":2,"name":"time-pos"}"#);
        assert_eq!(translate(&unset), None);
    }

    #[test]
    fn test_translate_end_of_track() {
        let eof = parse(r#"{"event":"property-change","id":4,"name":"eof-reached","data":true}"#);
        assert_eq!(translate(&eof), Some(EngineEvent::Ended));

        let not_eof = parse(r#"{"event":"property-change","id":4,"name":"eof-reached","data":false}"#);
        assert_eq!(translate(&not_eof), None);

        let end_file = parse(r#"{"event":"end-file","reason":"eof"}"#);
        assert_eq!(translate(&end_file), Some(EngineEvent::Ended));

        let stopped = parse(r#"{"event":"end-file","reason":"stop"}"#);
        assert_eq!(translate(&stopped), None);
    }

    #[test]
    fn test_translate_error() {
        let err = parse(r#"{"event":"end-file","reason":"error","file_error":"loading failed"}"#);
        assert_eq!(
            translate(&err),
            Some(EngineEvent::Error {
                code: MEDIA_ERR_SRC_NOT_SUPPORTED,
                message: "loading failed".to_string(),
            })
        );
    }
}
