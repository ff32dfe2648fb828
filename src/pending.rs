use crate::error::Error;

/// Busy flag of one form's submit control.
#[derive(Debug, Default)]
pub struct InFlight(bool);

impl InFlight {
    pub fn is_busy(&self) -> bool {
        self.0
    }

    pub(crate) fn acquire(&mut self) -> Result<(), Error> {
        if self.0 {
            return Err(Error::Busy);
        }
        self.0 = true;
        Ok(())
    }

    pub(crate) fn release(&mut self) {
        self.0 = false;
    }
}

/// A request issued from a view, stamped with the view generation it belongs to.
#[derive(Clone, Debug)]
pub struct Ticket<T> {
    generation: u64,
    pub request: T,
}

impl<T> Ticket<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Monotonic counter bumped whenever a view's earlier requests stop mattering.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0
    }

    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn issue<T>(&self, request: T) -> Ticket<T> {
        Ticket {
            generation: self.0,
            request,
        }
    }

    pub fn is_current<T>(&self, ticket: &Ticket<T>) -> bool {
        ticket.generation == self.0
    }
}
