//! [`GesturePipeline`] – landmark provider → classifier → gesture sink.
//!
//! One [`GesturePipeline::step`] pulls a frame from the provider, classifies
//! it and, when a symbol comes out, hands it to a [`GestureSink`].  Frames
//! that fail validation are treated as "no hand"; a failing provider is
//! reported to the caller, which owns telling the user.

use std::time::Duration;

use lorikeet_hal::LandmarkProvider;
use lorikeet_perception::{ClassifierConfig, GestureClassifier};
use lorikeet_types::{GestureSymbol, LorikeetError};
use tracing::{debug, warn};

use crate::latch::CommandLatch;

/// Receives one call per frame that produced a symbol.
pub trait GestureSink {
    fn on_gesture(&mut self, symbol: GestureSymbol);
}

impl GestureSink for CommandLatch {
    fn on_gesture(&mut self, symbol: GestureSymbol) {
        self.post(symbol);
    }
}

impl GestureSink for Vec<GestureSymbol> {
    fn on_gesture(&mut self, symbol: GestureSymbol) {
        self.push(symbol);
    }
}

/// Frame counters kept by a [`GesturePipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    pub hands: u64,
    pub symbols: u64,
    pub malformed: u64,
}

/// Pulls frames from a provider of type `P` and classifies them.
pub struct GesturePipeline<P> {
    provider: P,
    classifier: GestureClassifier,
    stats: PipelineStats,
}

impl<P: LandmarkProvider> GesturePipeline<P> {
    pub fn new(provider: P, config: ClassifierConfig) -> Self {
        Self {
            provider,
            classifier: GestureClassifier::new(config),
            stats: PipelineStats::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Process the frame for time `now`.
    ///
    /// Returns the symbol emitted this frame, if any.
    ///
    /// # Errors
    ///
    /// Propagates [`LorikeetError::ProviderFault`] (and any other provider
    /// error except a malformed skeleton) untouched.
    pub fn step(
        &mut self,
        now: Duration,
        sink: &mut impl GestureSink,
    ) -> Result<Option<GestureSymbol>, LorikeetError> {
        self.stats.frames += 1;

        let frame = match self.provider.next_frame(now) {
            Ok(frame) => frame,
            Err(LorikeetError::MalformedSkeleton { expected, actual }) => {
                self.stats.malformed += 1;
                debug!(
                    provider = self.provider.id(),
                    expected, actual, "malformed frame treated as no hand"
                );
                None
            }
            Err(e) => {
                warn!(provider = self.provider.id(), error = %e, "landmark provider failed");
                return Err(e);
            }
        };

        if frame.is_some() {
            self.stats.hands += 1;
        }

        let symbol = self.classifier.classify(frame.as_ref());
        if let Some(symbol) = symbol {
            self.stats.symbols += 1;
            sink.on_gesture(symbol);
        }
        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorikeet_hal::{HandShape, ScriptedProvider};
    use lorikeet_types::{HandSkeleton, LANDMARK_COUNT, Landmark};

    /// Replays canned provider results in order, then faults.
    struct Replay {
        results: Vec<Frame>,
    }

    impl LandmarkProvider for Replay {
        fn id(&self) -> &str {
            "replay"
        }

        fn next_frame(&mut self, _now: Duration) -> Frame {
            if self.results.is_empty() {
                return Err(LorikeetError::ProviderFault {
                    provider: "replay".to_string(),
                    details: "end of recording".to_string(),
                });
            }
            self.results.remove(0)
        }
    }

    type Frame = Result<Option<HandSkeleton>, LorikeetError>;

    fn pipeline(results: Vec<Frame>) -> GesturePipeline<Replay> {
        GesturePipeline::new(Replay { results }, ClassifierConfig::default())
    }

    #[test]
    fn symbols_reach_the_sink() {
        let provider = ScriptedProvider::new("script")
            .then(0.0, HandShape::Open)
            .then(1.0, HandShape::Relaxed)
            .then(2.0, HandShape::Peace)
            .build();
        let mut p = GesturePipeline::new(provider, ClassifierConfig::default());
        let mut sink: Vec<GestureSymbol> = Vec::new();
        for secs in [0.5, 1.5, 2.5] {
            p.step(Duration::from_secs_f32(secs), &mut sink).unwrap();
        }
        assert_eq!(sink, vec![GestureSymbol::Open, GestureSymbol::Peace]);
        assert_eq!(
            p.stats(),
            PipelineStats {
                frames: 3,
                hands: 3,
                symbols: 2,
                malformed: 0
            }
        );
    }

    #[test]
    fn malformed_frame_is_no_hand() {
        let bad = HandSkeleton::new(vec![Landmark::default(); LANDMARK_COUNT - 1]).map(Some);
        let mut p = pipeline(vec![bad, Ok(HandShape::Fist.skeleton())]);
        let mut sink: Vec<GestureSymbol> = Vec::new();
        assert_eq!(p.step(Duration::ZERO, &mut sink), Ok(None));
        assert_eq!(p.step(Duration::ZERO, &mut sink), Ok(Some(GestureSymbol::Closed)));
        assert_eq!(p.stats().malformed, 1);
        assert_eq!(sink, vec![GestureSymbol::Closed]);
    }

    #[test]
    fn provider_fault_is_returned() {
        let mut p = pipeline(vec![]);
        let mut sink: Vec<GestureSymbol> = Vec::new();
        assert!(matches!(
            p.step(Duration::ZERO, &mut sink),
            Err(LorikeetError::ProviderFault { .. })
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn latch_sink_keeps_last_symbol() {
        let mut p = pipeline(vec![
            Ok(HandShape::Open.skeleton()),
            Ok(None),
            Ok(HandShape::Fist.skeleton()),
        ]);
        let mut latch = CommandLatch::new();
        for _ in 0..3 {
            p.step(Duration::ZERO, &mut latch).unwrap();
        }
        assert_eq!(latch.take(), Some(GestureSymbol::Closed));
    }
}
