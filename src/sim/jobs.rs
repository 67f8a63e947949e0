//! Day jobs: the only source of currency, and of suspicion.

/// Static info about a job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Currency per shift.
    pub salary: f64,
    /// Percent chance of being fired on each shift.
    pub suspicion_rate: f64,
    /// Currency ceiling while holding this job.
    pub max_currency: f64,
}

pub static JOBS: [JobInfo; 3] = [
    JobInfo {
        id: "intern",
        name: "Intern",
        salary: 5.0,
        suspicion_rate: 2.0,
        max_currency: 100.0,
    },
    JobInfo {
        id: "analyst",
        name: "Analyst",
        salary: 15.0,
        suspicion_rate: 5.0,
        max_currency: 500.0,
    },
    JobInfo {
        id: "manager",
        name: "Manager",
        salary: 40.0,
        suspicion_rate: 10.0,
        max_currency: 2_000.0,
    },
];

/// Where getting fired sends you.
pub const ENTRY_JOB: &str = "intern";

pub fn job_info(id: &str) -> Option<&'static JobInfo> {
    JOBS.iter().find(|j| j.id == id)
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobBoard {
    current: &'static JobInfo,
    /// Seconds until work or steal is allowed again.
    pub cooldown: f64,
}

impl JobBoard {
    pub fn new() -> Self {
        Self {
            current: &JOBS[0],
            cooldown: 0.0,
        }
    }

    pub fn current(&self) -> &'static JobInfo {
        self.current
    }

    /// Switch to a known job. Unknown ids leave the board unchanged.
    pub fn switch_to(&mut self, id: &str) -> bool {
        match job_info(id) {
            Some(info) => {
                self.current = info;
                true
            }
            None => false,
        }
    }

    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn tick(&mut self, dt: f64) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }
}

impl Default for JobBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_intern_and_ready() {
        let board = JobBoard::new();
        assert_eq!(board.current().id, ENTRY_JOB);
        assert!(board.ready());
    }

    #[test]
    fn unknown_job_is_ignored() {
        let mut board = JobBoard::new();
        assert!(!board.switch_to("astronaut"));
        assert_eq!(board.current().id, "intern");
        assert!(board.switch_to("manager"));
        assert_eq!(board.current().max_currency, 2_000.0);
    }

    #[test]
    fn cooldown_never_goes_negative() {
        let mut board = JobBoard::new();
        board.cooldown = 1.0;
        board.tick(0.4);
        assert!((board.cooldown - 0.6).abs() < 1e-12);
        board.tick(5.0);
        assert_eq!(board.cooldown, 0.0);
        assert!(board.ready());
    }

    #[test]
    fn ceilings_rise_with_seniority() {
        assert!(JOBS.windows(2).all(|w| w[0].max_currency < w[1].max_currency));
    }
}
