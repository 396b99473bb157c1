//! Style builder — declared style to a ready-to-apply style.
//!
//! Text-only styles resolve without awaiting anything. Image-bearing styles
//! fetch through the `AssetResolver`; a missing image leaves a hole in the
//! style rather than dropping it.

use beacon_assets::AssetResolver;
use beacon_core::types::{
    AssetRef, Image, Message, Person, ResolvedMessage, ResolvedPerson, ResolvedStyle, Style,
};
use futures::future::join_all;
use std::collections::HashMap;

use crate::text;

/// Build `style`. `None` means "apply no style": either none was asked for,
/// or the descriptor is malformed or unsupported.
pub async fn build_style(assets: &AssetResolver, style: &Style) -> Option<ResolvedStyle> {
    if let Err(reason) = validate(style) {
        tracing::warn!("⚠️ Ignoring malformed {} style: {reason}", style.kind());
        return None;
    }

    match style {
        Style::None => None,
        Style::Unsupported => {
            tracing::warn!("⚠️ Unsupported notification style, showing without one");
            None
        }
        Style::BigText {
            text: body,
            title,
            summary,
        } => Some(ResolvedStyle::BigText {
            text: text::render(body),
            title: title.as_deref().map(text::render),
            summary: summary.as_deref().map(text::render),
        }),
        Style::Inbox { lines, title, summary } => Some(ResolvedStyle::Inbox {
            lines: lines.iter().map(|l| text::render(l)).collect(),
            title: title.as_deref().map(text::render),
            summary: summary.as_deref().map(text::render),
        }),
        Style::Progress {
            current,
            max,
            indeterminate,
        } => Some(ResolvedStyle::Progress {
            current: *current,
            max: *max,
            indeterminate: *indeterminate,
        }),
        Style::BigPicture {
            picture,
            large_icon,
            title,
            summary,
        } => {
            let (picture, large_icon) = futures::join!(
                assets.resolve(Some(picture), "bigPicture"),
                assets.resolve(large_icon.as_ref(), "bigPicture largeIcon"),
            );
            Some(ResolvedStyle::BigPicture {
                picture,
                large_icon,
                title: title.as_deref().map(text::render),
                summary: summary.as_deref().map(text::render),
            })
        }
        Style::Messaging {
            person,
            messages,
            title,
            group,
        } => {
            let avatars = fetch_avatars(assets, person, messages).await;
            Some(ResolvedStyle::Messaging {
                user: resolve_person(person, &avatars),
                messages: messages
                    .iter()
                    .map(|m| ResolvedMessage {
                        text: text::render(&m.text),
                        timestamp: m.timestamp,
                        sender: m.person.as_ref().map(|p| resolve_person(p, &avatars)),
                    })
                    .collect(),
                title: title.as_deref().map(text::render),
                group: *group,
            })
        }
    }
}

fn validate(style: &Style) -> Result<(), &'static str> {
    match style {
        Style::BigText { text, .. } if text.trim().is_empty() => Err("empty text"),
        Style::Inbox { lines, .. } if lines.is_empty() => Err("no lines"),
        Style::Progress {
            current,
            max,
            indeterminate: false,
        } => {
            if *max == 0 {
                Err("max must be positive")
            } else if current > max {
                Err("current exceeds max")
            } else {
                Ok(())
            }
        }
        Style::Messaging { person, messages, .. } => {
            if person.name.trim().is_empty() {
                Err("user has no name")
            } else if messages.is_empty() {
                Err("no messages")
            } else if messages
                .iter()
                .filter_map(|m| m.person.as_ref())
                .any(|p| p.name.trim().is_empty())
            {
                Err("sender has no name")
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

/// Fetch every distinct avatar of the conversation concurrently.
async fn fetch_avatars<'a>(
    assets: &AssetResolver,
    user: &'a Person,
    messages: &'a [Message],
) -> HashMap<&'a AssetRef, Image> {
    let mut refs: Vec<&AssetRef> = user
        .icon
        .iter()
        .chain(
            messages
                .iter()
                .filter_map(|m| m.person.as_ref()?.icon.as_ref()),
        )
        .filter(|a| !a.is_empty())
        .collect();
    refs.sort();
    refs.dedup();

    let images = join_all(refs.iter().map(|a| assets.resolve(Some(*a), "person icon"))).await;
    refs.into_iter()
        .zip(images)
        .filter_map(|(asset, image)| Some((asset, image?)))
        .collect()
}

fn resolve_person(person: &Person, avatars: &HashMap<&AssetRef, Image>) -> ResolvedPerson {
    ResolvedPerson {
        name: person.name.clone(),
        id: person.id.clone(),
        avatar: person.icon.as_ref().and_then(|a| avatars.get(a).cloned()),
        bot: person.bot,
        important: person.important,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use beacon_core::traits::{AssetFetcher, FetchError};
    use beacon_core::types::ImageFormat;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves anything except `missing*`, counting calls.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AssetFetcher for CountingFetcher {
        async fn fetch(&self, asset: &AssetRef) -> Result<Image, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if asset.as_str().starts_with("missing") {
                return Err(FetchError::NotFound(asset.to_string()));
            }
            Ok(Image {
                source: asset.to_string(),
                format: ImageFormat::Jpeg,
                bytes: vec![0xFF],
            })
        }
    }

    fn setup() -> (Arc<CountingFetcher>, AssetResolver) {
        let fetcher = Arc::new(CountingFetcher::default());
        let resolver = AssetResolver::new(fetcher.clone(), Duration::from_secs(1));
        (fetcher, resolver)
    }

    fn person(name: &str, icon: Option<&str>) -> Person {
        Person {
            icon: icon.map(AssetRef::new),
            ..Person::new(name)
        }
    }

    #[tokio::test]
    async fn test_none_and_unsupported_skip_fetch() {
        let (fetcher, assets) = setup();
        assert!(build_style(&assets, &Style::None).await.is_none());
        assert!(build_style(&assets, &Style::Unsupported).await.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_text_styles_need_no_fetch() {
        let (fetcher, assets) = setup();
        let style = Style::BigText {
            text: "<b>Long</b> text".into(),
            title: None,
            summary: Some("sum".into()),
        };
        match build_style(&assets, &style).await {
            Some(ResolvedStyle::BigText { text, summary, .. }) => {
                assert_eq!(text.as_str(), "Long text");
                assert_eq!(summary.unwrap().as_str(), "sum");
            }
            other => panic!("unexpected {other:?}"),
        }

        let style = Style::Inbox {
            lines: vec!["one".into(), "two".into()],
            title: None,
            summary: None,
        };
        assert!(matches!(
            build_style(&assets, &style).await,
            Some(ResolvedStyle::Inbox { lines, .. }) if lines.len() == 2
        ));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_styles() {
        let (_, assets) = setup();
        let malformed = [
            Style::BigText {
                text: "  ".into(),
                title: None,
                summary: None,
            },
            Style::Inbox {
                lines: vec![],
                title: None,
                summary: None,
            },
            Style::Progress {
                current: 5,
                max: 0,
                indeterminate: false,
            },
            Style::Progress {
                current: 11,
                max: 10,
                indeterminate: false,
            },
            Style::Messaging {
                person: person("", None),
                messages: vec![],
                title: None,
                group: false,
            },
        ];
        for style in &malformed {
            assert!(build_style(&assets, style).await.is_none(), "{style:?}");
        }

        let spinner = Style::Progress {
            current: 0,
            max: 0,
            indeterminate: true,
        };
        assert!(build_style(&assets, &spinner).await.is_some());
    }

    #[tokio::test]
    async fn test_big_picture_missing_image_degrades() {
        let (_, assets) = setup();
        let style = Style::BigPicture {
            picture: "missing.jpg".into(),
            large_icon: Some("icon.jpg".into()),
            title: Some("t".into()),
            summary: None,
        };
        match build_style(&assets, &style).await {
            Some(ResolvedStyle::BigPicture {
                picture,
                large_icon,
                title,
                ..
            }) => {
                assert!(picture.is_none());
                assert_eq!(large_icon.unwrap().source, "icon.jpg");
                assert_eq!(title.unwrap().as_str(), "t");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_messaging_avatars_deduplicated() {
        let (fetcher, assets) = setup();
        let alice = person("Alice", Some("alice.jpg"));
        let style = Style::Messaging {
            person: person("Me", Some("me.jpg")),
            messages: vec![
                Message {
                    text: "hi".into(),
                    timestamp: 1,
                    person: Some(alice.clone()),
                },
                Message {
                    text: "there".into(),
                    timestamp: 2,
                    person: Some(alice),
                },
                Message {
                    text: "yo".into(),
                    timestamp: 3,
                    person: Some(person("Bob", Some("missing-bob.jpg"))),
                },
                Message {
                    text: "mine".into(),
                    timestamp: 4,
                    person: None,
                },
            ],
            title: None,
            group: true,
        };

        let Some(ResolvedStyle::Messaging { user, messages, group, .. }) =
            build_style(&assets, &style).await
        else {
            panic!("expected messaging style");
        };
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(user.avatar.unwrap().source, "me.jpg");
        assert!(group);
        assert_eq!(messages.len(), 4);
        let alice = messages[1].sender.as_ref().unwrap();
        assert_eq!(alice.avatar.as_ref().unwrap().source, "alice.jpg");
        let bob = messages[2].sender.as_ref().unwrap();
        assert_eq!(bob.name, "Bob");
        assert!(bob.avatar.is_none());
        assert!(messages[3].sender.is_none());
    }
}
