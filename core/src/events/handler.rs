use super::CoreSignal;

/// Receives the signals drained from the overlay session each tick
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &CoreSignal);

    fn handle_signals(&mut self, signals: &[CoreSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}

/// Collects every signal, for tests and the replay tool
impl SignalHandler for Vec<CoreSignal> {
    fn handle_signal(&mut self, signal: &CoreSignal) {
        self.push(signal.clone());
    }
}
